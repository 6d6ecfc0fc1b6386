//! # Initialization Scenarios
//!
//! Settings normalisation, provider resolution, the host-injected
//! transport and the optional local signer.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use web3_session::{
        resolve, ConfigError, Endpoint, FixedTransportFactory, HostEnvironment,
        HttpTransportFactory, MockTransport, ProviderDescriptor, SessionConfig, SessionError,
        Settings, Signer, TokioTimerService, TransportError, Web3Service, Web3SessionApi,
        Web3Transport, DEFAULT_PROVIDER_URL, TEST_PROVIDER_URL,
    };

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn service_with(factory: Arc<FixedTransportFactory>) -> Web3Service {
        Web3Service::new(
            SessionConfig::for_testing(),
            Arc::new(TokioTimerService::new()),
            factory,
        )
    }

    fn mock_factory() -> Arc<FixedTransportFactory> {
        Arc::new(FixedTransportFactory::new(Arc::new(MockTransport::default())))
    }

    #[test]
    fn test_no_settings_uses_default_endpoint() {
        let factory = mock_factory();
        let service = service_with(factory.clone());

        service.initialize(None, HostEnvironment::default()).unwrap();

        assert_eq!(factory.endpoints(), vec![Endpoint::new(DEFAULT_PROVIDER_URL)]);
    }

    #[test]
    fn test_partial_settings_keep_default_provider() {
        let factory = mock_factory();
        let service = service_with(factory.clone());
        let settings = Settings::from_json(r#"{"usePresetProvider": false}"#).unwrap();

        service.initialize(Some(settings), HostEnvironment::default()).unwrap();

        assert_eq!(factory.endpoints(), vec![Endpoint::new(DEFAULT_PROVIDER_URL)]);
    }

    #[test]
    fn test_hosted_provider_endpoint() {
        let factory = mock_factory();
        let service = service_with(factory.clone());
        let settings = Settings::from_json(
            r#"{"provider": {"type": "hosted", "network": "mainnet", "accessKey": "k3y"}}"#,
        )
        .unwrap();

        service.initialize(Some(settings), HostEnvironment::default()).unwrap();

        assert_eq!(
            factory.endpoints(),
            vec![Endpoint::new("https://mainnet.infura.io/k3y")]
        );
    }

    #[test]
    fn test_unrecognized_provider_fails_initialize() {
        let settings = Settings::from_json(r#"{"provider": {"type": "websocket"}}"#).unwrap();
        assert_eq!(settings.provider, ProviderDescriptor::Unsupported);
        assert!(resolve(&settings.provider).is_err());

        let factory = mock_factory();
        let service = service_with(factory.clone());
        let result = service.initialize(Some(settings), HostEnvironment::default());

        assert!(matches!(
            result,
            Err(SessionError::Configuration(ConfigError::IllegalProviderType(_)))
        ));
        assert!(factory.endpoints().is_empty());
        assert!(matches!(service.provider(), Err(SessionError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_injected_transport_is_used() {
        let injected = Arc::new(MockTransport::default());
        let factory = mock_factory();
        let service = service_with(factory.clone());

        service
            .initialize(None, HostEnvironment::with_transport(injected.clone()))
            .unwrap();
        service.connect().await.unwrap();

        assert!(factory.endpoints().is_empty());
        assert!(injected.call_count() >= 4);
        assert!(service.provider().unwrap().is_injected());
    }

    #[test]
    fn test_injected_transport_ignored_when_opted_out() {
        let injected: Arc<dyn Web3Transport> = Arc::new(MockTransport::default());
        let factory = mock_factory();
        let service = service_with(factory.clone());
        let settings = Settings {
            use_preset_provider: false,
            provider: ProviderDescriptor::Test,
            private_key: None,
        };

        service
            .initialize(Some(settings), HostEnvironment::with_transport(injected))
            .unwrap();

        assert_eq!(factory.endpoints(), vec![Endpoint::new(TEST_PROVIDER_URL)]);
    }

    #[test]
    fn test_initialize_runs_once() {
        let service = service_with(mock_factory());
        service.initialize(None, HostEnvironment::default()).unwrap();
        assert_eq!(
            service.initialize(None, HostEnvironment::default()),
            Err(SessionError::AlreadyInitialized)
        );
    }

    #[test]
    fn test_private_key_builds_local_signer() {
        let service = service_with(mock_factory());
        let settings = Settings {
            private_key: Some(DEV_KEY.to_string()),
            ..Settings::default()
        };
        service.initialize(Some(settings), HostEnvironment::default()).unwrap();

        match service.signer().unwrap() {
            Signer::Local(local) => {
                assert_eq!(local.address(), DEV_ADDRESS);
                assert!(local.sign_message(b"session").is_ok());
            }
            other => panic!("expected a local signer, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_private_key_fails_initialize() {
        let service = service_with(mock_factory());
        let settings = Settings {
            private_key: Some("0x1234".to_string()),
            ..Settings::default()
        };
        assert!(matches!(
            service.initialize(Some(settings), HostEnvironment::default()),
            Err(SessionError::InvalidPrivateKey(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_http_node_fails_connect() {
        let service = Web3Service::new(
            SessionConfig::for_testing(),
            Arc::new(TokioTimerService::new()),
            Arc::new(HttpTransportFactory::default()),
        );
        let settings = Settings {
            use_preset_provider: false,
            provider: ProviderDescriptor::Direct {
                url: "http://127.0.0.1:9".to_string(),
            },
            private_key: None,
        };
        service.initialize(Some(settings), HostEnvironment::default()).unwrap();

        let result = service.connect().await;
        assert!(matches!(
            result,
            Err(SessionError::Transport(
                TransportError::Http(_) | TransportError::TimedOut(_)
            ))
        ));
        assert!(!service.is_connected());
    }
}
