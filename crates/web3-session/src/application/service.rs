//! # Web3 Service
//!
//! Application service owning the session state machine and its two
//! health checks.
//!
//! ## Serialisation
//!
//! Transport queries run without any lock held. Applying their outcome
//! to the session happens under one async mutex, and every transition
//! bumps a generation counter. A health check compares the generation it
//! started from before acting, so a verdict about a session that has
//! since been disconnected or reconnected is dropped. Reads go through a
//! `watch` snapshot and never wait on that mutex.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::adapters::{
    resolve, settle_within, HttpTransportFactory, LocalSigner, OnError, Provider, Settled, Signer,
    TokioTimerService,
};
use crate::config::{SessionConfig, Settings};
use crate::domain::{
    invariant_network_tracks_connection, invariant_same_account, invariant_same_network,
    ProviderDescriptor, SessionError, SessionState, SessionStatus, TransportError, VersionInfo,
    AUTHENTICATION_CHECK_TIMER, CONNECTION_CHECK_TIMER,
};
use crate::ports::{
    Callback, FixedTransportFactory, OnTick, TickFuture, TimerService, TransportFactory,
    Web3SessionApi, Web3Transport,
};

/// Collaborators the host process may provide to `initialize`.
#[derive(Clone, Default)]
pub struct HostEnvironment {
    injected: Option<Arc<dyn Web3Transport>>,
}

impl HostEnvironment {
    /// Host offering an already-configured transport (e.g. a wallet).
    pub fn with_transport(transport: Arc<dyn Web3Transport>) -> Self {
        Self {
            injected: Some(transport),
        }
    }

    /// The injected transport, if any.
    pub fn injected(&self) -> Option<&Arc<dyn Web3Transport>> {
        self.injected.as_ref()
    }
}

/// Whether each health check is currently scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthChecks {
    /// `web3CheckConnectionStatus` is active.
    pub connection: bool,
    /// `web3CheckAuthenticationStatus` is active.
    pub authentication: bool,
}

/// Objects built once by `initialize`.
struct Wiring {
    provider: Provider,
    signer: Option<Arc<LocalSigner>>,
}

type Query<T> = Result<Settled<T>, TransportError>;

struct Inner {
    config: SessionConfig,
    timers: Arc<dyn TimerService>,
    factory: Arc<dyn TransportFactory>,
    state: watch::Sender<SessionState>,
    status: watch::Sender<SessionStatus>,
    wiring: OnceLock<Wiring>,
    ops: Mutex<()>,
    generation: AtomicU64,
}

/// Web3 Service - connection/authentication lifecycle manager.
///
/// Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct Web3Service {
    inner: Arc<Inner>,
}

impl Web3Service {
    /// Create a service with explicit collaborators.
    pub fn new(
        config: SessionConfig,
        timers: Arc<dyn TimerService>,
        factory: Arc<dyn TransportFactory>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let (status, _) = watch::channel(SessionStatus::Disconnected);

        Self {
            inner: Arc::new(Inner {
                config,
                timers,
                factory,
                state,
                status,
                wiring: OnceLock::new(),
                ops: Mutex::new(()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Service with tokio timers and the HTTP JSON-RPC transport.
    pub fn with_defaults(config: SessionConfig) -> Self {
        let factory = HttpTransportFactory::with_timeout(config.request_timeout());
        Self::new(
            config,
            Arc::new(TokioTimerService::new()),
            Arc::new(factory),
        )
    }

    /// Initialised service that talks to `transport` through the test
    /// provider, with short health-check periods.
    pub fn build_test_service(transport: Arc<dyn Web3Transport>) -> Result<Self, SessionError> {
        let service = Self::new(
            SessionConfig::for_testing(),
            Arc::new(TokioTimerService::new()),
            Arc::new(FixedTransportFactory::new(transport)),
        );
        service.initialize(
            Some(Settings {
                provider: ProviderDescriptor::Test,
                ..Settings::default()
            }),
            HostEnvironment::default(),
        )?;
        Ok(service)
    }

    /// Build the transport, provider wrapper and optional local signer.
    ///
    /// An injected transport wins when `use_preset_provider` is set;
    /// otherwise the endpoint is resolved from `settings.provider`.
    ///
    /// # Errors
    /// - `AlreadyInitialized` on a second call
    /// - `Configuration` for an unresolvable provider or a zero check period
    /// - `InvalidPrivateKey` for an unusable key
    pub fn initialize(
        &self,
        settings: Option<Settings>,
        host: HostEnvironment,
    ) -> Result<(), SessionError> {
        if self.inner.wiring.get().is_some() {
            return Err(SessionError::AlreadyInitialized);
        }
        self.inner.config.validate().map_err(|e| {
            error!("[web3] Initialization failed: {}", e);
            e
        })?;

        let settings = Settings::normalize(settings);
        let wiring = self.build_wiring(&settings, &host).map_err(|e| {
            error!("[web3] Initialization failed: {}", e);
            e
        })?;

        info!(
            "[web3] Initialized with {:?} (local signer: {})",
            wiring.provider,
            wiring.signer.is_some()
        );

        self.inner
            .wiring
            .set(wiring)
            .map_err(|_| SessionError::AlreadyInitialized)
    }

    fn build_wiring(
        &self,
        settings: &Settings,
        host: &HostEnvironment,
    ) -> Result<Wiring, SessionError> {
        let provider = match host.injected() {
            Some(transport) if settings.use_preset_provider => {
                debug!("[web3] Using injected transport {}", transport.describe());
                Provider::new(Arc::clone(transport), None)
            }
            _ => {
                let endpoint = resolve(&settings.provider)?;
                let transport = self.inner.factory.build(&endpoint)?;
                Provider::new(transport, Some(endpoint))
            }
        };

        let signer = settings
            .private_key
            .as_deref()
            .map(|key| LocalSigner::from_hex(key, provider.clone()))
            .transpose()?
            .map(Arc::new);

        Ok(Wiring { provider, signer })
    }

    /// Status updates, starting with the current status.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status.subscribe()
    }

    /// Snapshot of the full session state.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Raw network identifier, `None` when disconnected.
    pub fn network(&self) -> Option<String> {
        self.inner.state.borrow().network().map(str::to_string)
    }

    /// Connected or better.
    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// Authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.status().is_authenticated()
    }

    /// The provider wrapper built by `initialize`.
    pub fn provider(&self) -> Result<Provider, SessionError> {
        Ok(self.inner.wiring()?.provider.clone())
    }

    /// The signing identity: the local key if one was configured,
    /// otherwise the node acting for the default account.
    ///
    /// # Errors
    /// - `NotInitialized` before `initialize`
    /// - `NotAuthenticated` without a local key while not authenticated
    pub fn signer(&self) -> Result<Signer, SessionError> {
        let wiring = self.inner.wiring()?;
        if let Some(local) = &wiring.signer {
            return Ok(Signer::Local(Arc::clone(local)));
        }
        Ok(Signer::Node {
            account: self.default_account()?,
            provider: wiring.provider.clone(),
        })
    }

    /// Which health checks are scheduled.
    pub fn health_checks(&self) -> HealthChecks {
        HealthChecks {
            connection: self.inner.timers.is_active(CONNECTION_CHECK_TIMER),
            authentication: self.inner.timers.is_active(AUTHENTICATION_CHECK_TIMER),
        }
    }

    fn arm_connection_check(&self) {
        if self.inner.timers.is_active(CONNECTION_CHECK_TIMER) {
            return;
        }
        let on_tick = tick_handler(Arc::downgrade(&self.inner), |inner| {
            Box::pin(async move { inner.check_connection().await })
        });
        self.inner.timers.create_timer(
            CONNECTION_CHECK_TIMER,
            self.inner.config.connection_check_interval(),
            true,
            on_tick,
        );
    }

    fn arm_authentication_check(&self) {
        if self.inner.timers.is_active(AUTHENTICATION_CHECK_TIMER) {
            return;
        }
        let on_tick = tick_handler(Arc::downgrade(&self.inner), |inner| {
            Box::pin(async move { inner.check_authentication().await })
        });
        self.inner.timers.create_timer(
            AUTHENTICATION_CHECK_TIMER,
            self.inner.config.authentication_check_interval(),
            true,
            on_tick,
        );
    }
}

/// Tick handler that runs `check` while the service is alive.
fn tick_handler<F>(inner: Weak<Inner>, check: F) -> OnTick
where
    F: Fn(Arc<Inner>) -> TickFuture + Send + Sync + 'static,
{
    Arc::new(move || -> TickFuture {
        match inner.upgrade() {
            Some(inner) => check(inner),
            None => Box::pin(async {}),
        }
    })
}

fn collect_versions(
    api: &str,
    node: Query<String>,
    network: Query<String>,
    ethereum: Query<String>,
    whisper: Query<Option<String>>,
) -> Result<VersionInfo, TransportError> {
    Ok(VersionInfo {
        api: Some(api.to_string()),
        node: Some(node?.into_inner()),
        network: Some(network?.into_inner()),
        ethereum: Some(ethereum?.into_inner()),
        whisper: whisper?.into_inner(),
    })
}

impl Inner {
    fn wiring(&self) -> Result<&Wiring, SessionError> {
        self.wiring.get().ok_or(SessionError::NotInitialized)
    }

    fn transport(&self) -> Result<Arc<dyn Web3Transport>, SessionError> {
        Ok(Arc::clone(self.wiring()?.provider.transport()))
    }

    /// Recorded field and generation, read together under `ops`.
    async fn snapshot(&self, field: fn(&SessionState) -> Option<&str>) -> Option<(String, u64)> {
        let _ops = self.ops.lock().await;
        let recorded = field(&self.state.borrow())?.to_string();
        Some((recorded, self.generation.load(Ordering::Acquire)))
    }

    fn advance_generation(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) != generation
    }

    /// Health-check queries are bounded by the check period unless a
    /// request timeout is configured.
    fn check_timeout(&self, period: Duration) -> Option<Duration> {
        Some(self.config.request_timeout().unwrap_or(period))
    }

    async fn query_network(
        &self,
        transport: &Arc<dyn Web3Transport>,
        timeout: Option<Duration>,
    ) -> Option<String> {
        let (node, network) = tokio::join!(
            settle_within(
                |done: Callback<String>| transport.node_version(done),
                OnError::Propagate,
                timeout,
            ),
            settle_within(
                |done: Callback<String>| transport.network_version(done),
                OnError::Propagate,
                timeout,
            ),
        );
        match (node, network) {
            (Ok(_), Ok(network)) => Some(network.into_inner()),
            (Err(e), _) | (_, Err(e)) => {
                debug!("[web3] Connection check query failed: {}", e);
                None
            }
        }
    }

    /// One tick of `web3CheckConnectionStatus`.
    async fn check_connection(&self) {
        let Some((recorded, generation)) = self.snapshot(SessionState::network).await else {
            return;
        };
        let Ok(transport) = self.transport() else {
            return;
        };

        let timeout = self.check_timeout(self.config.connection_check_interval());
        let observed = self.query_network(&transport, timeout).await;
        if invariant_same_network(observed.as_deref(), Some(&recorded)) {
            return;
        }

        let _ops = self.ops.lock().await;
        if self.is_stale(generation) {
            debug!("[web3] Dropping connection verdict for an earlier session");
            return;
        }
        warn!(
            "[web3] Connection lost (network {} -> {:?})",
            recorded, observed
        );
        self.disconnect_locked();
    }

    /// One tick of `web3CheckAuthenticationStatus`.
    async fn check_authentication(&self) {
        let Some((recorded, generation)) = self.snapshot(SessionState::account).await else {
            return;
        };
        let Ok(transport) = self.transport() else {
            return;
        };

        let accounts = settle_within(
            |done: Callback<Vec<String>>| transport.accounts(done),
            OnError::Substitute(Vec::new()),
            self.check_timeout(self.config.authentication_check_interval()),
        )
        .await
        .map(Settled::into_inner)
        .unwrap_or_default();

        if invariant_same_account(&accounts, Some(&recorded)) {
            return;
        }

        let _ops = self.ops.lock().await;
        if self.is_stale(generation) {
            debug!("[web3] Dropping authentication verdict for an earlier session");
            return;
        }
        warn!(
            "[web3] Authentication lost (account {} -> {:?})",
            recorded,
            accounts.first()
        );
        self.deauthenticate_locked();
    }

    fn disconnect_locked(&self) {
        let changed = self.state.send_if_modified(SessionState::disconnect);
        self.timers.cancel(CONNECTION_CHECK_TIMER);
        self.timers.cancel(AUTHENTICATION_CHECK_TIMER);
        if changed {
            self.advance_generation();
            info!("[web3] Disconnected");
        }
        self.publish_status();
    }

    fn deauthenticate_locked(&self) {
        let changed = self.state.send_if_modified(SessionState::deauthenticate);
        self.timers.cancel(AUTHENTICATION_CHECK_TIMER);
        if changed {
            self.advance_generation();
            info!("[web3] Deauthenticated");
        }
        self.publish_status();
    }

    fn publish_status(&self) {
        debug_assert!(invariant_network_tracks_connection(&self.state.borrow()));
        let next = self.state.borrow().status();
        let mut previous = next;
        let changed = self.status.send_if_modified(|status| {
            previous = std::mem::replace(status, next);
            previous != next
        });
        if changed {
            web3_telemetry::log_transition!("web3", previous, next);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.timers.cancel(CONNECTION_CHECK_TIMER);
        self.timers.cancel(AUTHENTICATION_CHECK_TIMER);
    }
}

#[async_trait]
impl Web3SessionApi for Web3Service {
    async fn connect(&self) -> Result<VersionInfo, SessionError> {
        let transport = self.inner.transport()?;
        let timeout = self.inner.config.request_timeout();

        let (node, network, ethereum, whisper) = tokio::join!(
            settle_within(
                |done: Callback<String>| transport.node_version(done),
                OnError::Propagate,
                timeout,
            ),
            settle_within(
                |done: Callback<String>| transport.network_version(done),
                OnError::Propagate,
                timeout,
            ),
            settle_within(
                |done: Callback<String>| transport.protocol_version(done),
                OnError::Propagate,
                timeout,
            ),
            settle_within(
                |done: Callback<Option<String>>| {
                    transport.whisper_version(Box::new(
                        move |result: Result<String, TransportError>| done(result.map(Some)),
                    ))
                },
                OnError::Substitute(None),
                timeout,
            ),
        );

        let version = match collect_versions(
            transport.api_version(),
            node,
            network,
            ethereum,
            whisper,
        ) {
            Ok(version) => version,
            Err(e) => {
                error!("[web3] Connect failed: {}", e);
                return Err(e.into());
            }
        };

        let _ops = self.inner.ops.lock().await;
        if self
            .inner
            .state
            .send_if_modified(|state| state.connect(version.clone()))
        {
            self.inner.advance_generation();
        }
        self.inner.publish_status();
        self.arm_connection_check();

        info!("[web3] Web3 version: {:?}", version);
        Ok(version)
    }

    async fn authenticate(&self) -> Result<String, SessionError> {
        info!("[web3] Web3 is authenticating...");

        let transport = self.inner.transport()?;
        let connected = self.inner.state.borrow().status().is_connected();
        if !connected {
            error!("[web3] Authenticate refused: {}", SessionError::NotConnected);
            return Err(SessionError::NotConnected);
        }

        let accounts = settle_within(
            |done: Callback<Vec<String>>| transport.accounts(done),
            OnError::Propagate,
            self.inner.config.request_timeout(),
        )
        .await;

        let account = match accounts.map(Settled::into_inner) {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => account,
                None => {
                    error!("[web3] {}", SessionError::NoAccounts);
                    return Err(SessionError::NoAccounts);
                }
            },
            Err(e) => {
                error!("[web3] Authenticate failed: {}", e);
                return Err(e.into());
            }
        };

        // The session may have dropped while the node was answering
        let _ops = self.inner.ops.lock().await;
        let mut outcome = Ok(false);
        self.inner.state.send_if_modified(|state| {
            outcome = state.authenticate(account.clone());
            matches!(outcome, Ok(true))
        });
        if outcome? {
            self.inner.advance_generation();
        }

        self.inner.publish_status();
        self.arm_authentication_check();

        info!("[web3] Authenticated as {}", account);
        Ok(account)
    }

    async fn disconnect(&self) {
        let _ops = self.inner.ops.lock().await;
        self.inner.disconnect_locked();
    }

    async fn deauthenticate(&self) {
        let _ops = self.inner.ops.lock().await;
        self.inner.deauthenticate_locked();
    }

    fn version(&self) -> VersionInfo {
        self.inner.state.borrow().version().clone()
    }

    fn network_id(&self) -> Result<u64, SessionError> {
        let network = self.network().ok_or(SessionError::NotConnected)?;
        network
            .trim()
            .parse::<u64>()
            .map_err(|_| SessionError::InvalidNetworkId(network))
    }

    fn default_account(&self) -> Result<String, SessionError> {
        self.inner
            .state
            .borrow()
            .account()
            .map(str::to_string)
            .ok_or(SessionError::NotAuthenticated)
    }

    fn status(&self) -> SessionStatus {
        self.inner.state.borrow().status()
    }
}
