//! # Health-Check Scenarios
//!
//! A live session whose node changes underneath it. Each scenario arms a
//! one-shot timer that rewrites the mock's replies, then lets the paused
//! clock run until the recurring check has had a chance to notice.
//!
//! Periods come from `SessionConfig::for_testing()`: 50 ms for the
//! connection check, 30 ms for the authentication check.

#[cfg(test)]
mod tests {
    use super::super::support::{advance, Session};
    use std::time::Duration;
    use web3_session::{
        MockReply, SessionError, SessionStatus, TransportError, Web3SessionApi,
        AUTHENTICATION_CHECK_TIMER, CONNECTION_CHECK_TIMER,
    };

    // =========================================================================
    // CONNECTION CHECK
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_network_swap_disconnects() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        assert_eq!(session.service.network_id().unwrap(), 42);

        session.change_after("changeNetwork", Duration::from_millis(50), |s| {
            s.network = MockReply::Value("999".to_string())
        });
        advance(200).await;

        assert_eq!(session.service.status(), SessionStatus::Disconnected);
        assert_eq!(session.service.network_id(), Err(SessionError::NotConnected));
        assert!(!session.service.health_checks().connection);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresponsive_node_disconnects() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();

        session.change_after("disconnect", Duration::from_millis(50), |s| {
            s.node = MockReply::Refuse(TransportError::Rejected("disconnected".to_string()))
        });
        advance(200).await;

        assert!(!session.service.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_swap_also_drops_authentication() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        session.service.authenticate().await.unwrap();

        session.mock.update(|s| s.network = MockReply::Value("999".to_string()));
        advance(100).await;

        assert_eq!(session.service.status(), SessionStatus::Disconnected);
        assert!(session.service.default_account().is_err());
        let checks = session.service.health_checks();
        assert!(!checks.connection);
        assert!(!checks.authentication);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stable_node_stays_connected() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        let calls_after_connect = session.mock.call_count();

        advance(500).await;

        assert!(session.service.is_connected());
        assert_eq!(session.timers.started(CONNECTION_CHECK_TIMER), 1);
        // Each tick issues a node and a network query.
        assert!(session.mock.call_count() >= calls_after_connect + 2 * 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_disconnect() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        session.service.disconnect().await;
        let calls = session.mock.call_count();

        advance(500).await;

        assert_eq!(session.mock.call_count(), calls);
    }

    // =========================================================================
    // AUTHENTICATION CHECK
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_empty_account_list_deauthenticates() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        assert_eq!(session.service.authenticate().await.unwrap(), "0xABC");

        session.change_after("deauthenticate", Duration::from_millis(50), |s| {
            s.accounts = MockReply::Value(Vec::new())
        });
        advance(150).await;

        assert_eq!(session.service.status(), SessionStatus::Connected);
        assert_eq!(
            session.service.default_account(),
            Err(SessionError::NotAuthenticated)
        );
        let checks = session.service.health_checks();
        assert!(checks.connection);
        assert!(!checks.authentication);
    }

    #[tokio::test(start_paused = true)]
    async fn test_account_change_deauthenticates() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        session.service.authenticate().await.unwrap();

        session.change_after("changeAccount", Duration::from_millis(50), |s| {
            s.accounts = MockReply::Value(vec!["0x123456789".to_string()])
        });
        advance(150).await;

        assert!(!session.service.is_authenticated());
        assert!(session.service.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_extra_accounts_do_not_matter() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        session.service.authenticate().await.unwrap();

        session.mock.update(|s| {
            s.accounts = MockReply::Value(vec!["0xABC".to_string(), "0x999".to_string()])
        });
        advance(150).await;

        assert_eq!(session.service.default_account().unwrap(), "0xABC");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_account_query_deauthenticates() {
        let session = Session::new().unwrap();
        session.service.connect().await.unwrap();
        session.service.authenticate().await.unwrap();

        session.mock.update(|s| {
            s.accounts = MockReply::Fail(TransportError::Http("reset".to_string()))
        });
        advance(100).await;

        assert_eq!(session.service.status(), SessionStatus::Connected);
        assert_eq!(session.timers.started(AUTHENTICATION_CHECK_TIMER), 1);
    }

    // =========================================================================
    // STATUS NOTIFICATIONS
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_subscriber_sees_every_transition() {
        let session = Session::new().unwrap();
        let mut status = session.service.subscribe();
        assert_eq!(*status.borrow(), SessionStatus::Disconnected);

        session.service.connect().await.unwrap();
        status.changed().await.unwrap();
        assert_eq!(*status.borrow_and_update(), SessionStatus::Connected);

        session.service.authenticate().await.unwrap();
        status.changed().await.unwrap();
        assert_eq!(*status.borrow_and_update(), SessionStatus::Authenticated);

        session.mock.update(|s| s.accounts = MockReply::Value(Vec::new()));
        status.changed().await.unwrap();
        assert_eq!(*status.borrow_and_update(), SessionStatus::Connected);

        session.mock.update(|s| s.network = MockReply::Value("999".to_string()));
        status.changed().await.unwrap();
        assert_eq!(*status.borrow_and_update(), SessionStatus::Disconnected);
    }
}
