//! # Lifecycle Scenarios
//!
//! Connect, authenticate and their explicit reversals, observed through
//! the accessors a consumer would use.

#[cfg(test)]
mod tests {
    use super::super::support::{advance, Session};
    use web3_session::{
        MockReply, SessionError, SessionState, SessionStatus, TransportError, VersionInfo,
        Web3SessionApi, AUTHENTICATION_CHECK_TIMER, CONNECTION_CHECK_TIMER,
    };

    // =========================================================================
    // CONNECT
    // =========================================================================

    #[tokio::test]
    async fn test_connect_tolerates_missing_messaging_layer() {
        let session = Session::new().unwrap();

        session.service.connect().await.unwrap();

        assert_eq!(
            session.service.version(),
            VersionInfo {
                api: Some(web3_session::ports::MOCK_API_VERSION.to_string()),
                node: Some("v1".to_string()),
                network: Some("42".to_string()),
                ethereum: Some("eth1".to_string()),
                whisper: None,
            }
        );
        assert_eq!(session.service.network_id().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_network_id_fails_before_connect() {
        let session = Session::new().unwrap();
        assert_eq!(session.service.network_id(), Err(SessionError::NotConnected));
        assert!(session.service.version().network.is_none());
    }

    #[tokio::test]
    async fn test_connect_twice_is_idempotent() {
        let session = Session::new().unwrap();

        session.service.connect().await.unwrap();
        let first = session.service.state();
        session.service.connect().await.unwrap();

        assert_eq!(session.service.state(), first);
        assert_eq!(session.timers.started(CONNECTION_CHECK_TIMER), 1);
    }

    #[tokio::test]
    async fn test_failed_network_query_fails_connect() {
        let session = Session::new().unwrap();
        session.mock.update(|s| {
            s.network = MockReply::Fail(TransportError::Rpc {
                code: -32000,
                message: "unavailable".to_string(),
            })
        });

        let result = session.service.connect().await;
        assert!(matches!(result, Err(SessionError::Transport(TransportError::Rpc { .. }))));
        assert_eq!(session.service.state(), SessionState::default());
        assert_eq!(session.timers.started(CONNECTION_CHECK_TIMER), 0);
    }

    #[tokio::test]
    async fn test_dropped_callback_fails_connect() {
        let session = Session::new().unwrap();
        session.mock.update(|s| s.node = MockReply::Drop);

        assert_eq!(
            session.service.connect().await,
            Err(SessionError::Transport(TransportError::CallbackDropped))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_node_times_out() {
        let session = Session::new().unwrap();
        session.mock.update(|s| s.protocol = MockReply::Hang);

        let result = session.service.connect().await;
        assert_eq!(
            result,
            Err(SessionError::Transport(TransportError::TimedOut(1_000)))
        );
        assert_eq!(session.mock.parked_count(), 1);
        assert!(!session.service.is_connected());
    }

    // =========================================================================
    // AUTHENTICATE
    // =========================================================================

    #[tokio::test]
    async fn test_authenticate_uses_first_account() {
        let session = Session::new().unwrap();
        session.mock.update(|s| {
            s.accounts = MockReply::Value(vec!["0xABC".to_string(), "0xDEF".to_string()])
        });
        assert_eq!(
            session.service.default_account(),
            Err(SessionError::NotAuthenticated)
        );

        session.service.connect().await.unwrap();
        session.service.authenticate().await.unwrap();

        assert_eq!(session.service.default_account().unwrap(), "0xABC");
        assert_eq!(session.service.status(), SessionStatus::Authenticated);
    }

    #[tokio::test]
    async fn test_empty_account_list_does_not_arm_check() {
        let session = Session::new().unwrap();
        session.mock.update(|s| s.accounts = MockReply::Value(Vec::new()));
        session.service.connect().await.unwrap();

        assert_eq!(
            session.service.authenticate().await,
            Err(SessionError::NoAccounts)
        );
        assert!(session.service.default_account().is_err());
        assert_eq!(session.timers.started(AUTHENTICATION_CHECK_TIMER), 0);
        assert!(!session.service.health_checks().authentication);
    }

    #[tokio::test]
    async fn test_synchronous_refusal_fails_authenticate() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        session.mock.update(|s| {
            s.accounts = MockReply::Refuse(TransportError::Rejected("locked".to_string()))
        });

        let result = session.service.authenticate().await;
        assert_eq!(
            result,
            Err(SessionError::Transport(TransportError::Rejected(
                "locked".to_string()
            )))
        );
        assert!(session.service.default_account().is_err());
        assert_eq!(session.service.status(), SessionStatus::Connected);
    }

    #[tokio::test]
    async fn test_authenticate_while_disconnected_is_refused() {
        let session = Session::new().unwrap();
        assert_eq!(
            session.service.authenticate().await,
            Err(SessionError::NotConnected)
        );
        assert_eq!(session.mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reauthenticate_does_not_restart_check() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        session.service.authenticate().await.unwrap();
        session.service.authenticate().await.unwrap();

        assert_eq!(session.timers.started(AUTHENTICATION_CHECK_TIMER), 1);
    }

    // =========================================================================
    // EXPLICIT DOWNGRADES
    // =========================================================================

    #[tokio::test]
    async fn test_disconnect_clears_account() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        session.service.authenticate().await.unwrap();

        session.service.disconnect().await;

        assert_eq!(session.service.status(), SessionStatus::Disconnected);
        assert!(session.service.default_account().is_err());
        assert!(session.service.network_id().is_err());
        let checks = session.service.health_checks();
        assert!(!checks.connection);
        assert!(!checks.authentication);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_after_disconnect_rearms_check() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        session.service.disconnect().await;
        advance(10).await;

        session.service.connect().await.unwrap();
        assert!(session.service.health_checks().connection);
        assert_eq!(session.timers.started(CONNECTION_CHECK_TIMER), 2);
    }
}
