//! Shared fixtures for the scenario tests.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use web3_session::{
    FixedTransportFactory, HostEnvironment, MockScript, MockTransport, OnTick, ProviderDescriptor,
    SessionConfig, SessionError, Settings, TickFuture, TimerService, TokioTimerService, Web3Service,
};

/// Tokio timers that remember how often each name was started.
#[derive(Default)]
pub struct RecordingTimers {
    inner: TokioTimerService,
    started: Mutex<HashMap<String, usize>>,
}

impl RecordingTimers {
    /// How many times `name` was started.
    pub fn started(&self, name: &str) -> usize {
        self.started.lock().get(name).copied().unwrap_or(0)
    }
}

impl TimerService for RecordingTimers {
    fn create_timer(&self, name: &str, interval: Duration, recurring: bool, on_tick: OnTick) {
        *self.started.lock().entry(name.to_string()).or_insert(0) += 1;
        self.inner.create_timer(name, interval, recurring, on_tick);
    }

    fn cancel(&self, name: &str) -> bool {
        self.inner.cancel(name)
    }

    fn is_active(&self, name: &str) -> bool {
        self.inner.is_active(name)
    }
}

/// An initialised service wired to a scriptable transport.
pub struct Session {
    pub service: Web3Service,
    pub mock: Arc<MockTransport>,
    pub timers: Arc<RecordingTimers>,
}

impl Session {
    /// Session over the default mock script.
    pub fn new() -> Result<Self, SessionError> {
        Self::with_script(MockScript::default())
    }

    /// Session whose transport follows `script`.
    pub fn with_script(script: MockScript) -> Result<Self, SessionError> {
        let mock = Arc::new(MockTransport::new(script));
        let timers = Arc::new(RecordingTimers::default());
        let service = Web3Service::new(
            SessionConfig::for_testing(),
            timers.clone(),
            Arc::new(FixedTransportFactory::new(mock.clone())),
        );
        service.initialize(
            Some(Settings {
                provider: ProviderDescriptor::Test,
                ..Settings::default()
            }),
            HostEnvironment::default(),
        )?;
        Ok(Self {
            service,
            mock,
            timers,
        })
    }

    /// Change the transport's replies `after` from now, once.
    pub fn change_after<F>(&self, name: &str, after: Duration, change: F)
    where
        F: Fn(&mut MockScript) + Send + Sync + 'static,
    {
        let mock = Arc::clone(&self.mock);
        let change = Arc::new(change);
        let on_tick: OnTick = Arc::new(move || -> TickFuture {
            let mock = Arc::clone(&mock);
            let change = Arc::clone(&change);
            Box::pin(async move { mock.update(|script| change(script)) })
        });
        self.timers.create_timer(name, after, false, on_tick);
    }
}

/// Let paused time run forward.
pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
