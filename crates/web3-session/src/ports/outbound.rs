//! # Outbound Ports
//!
//! Traits for external dependencies: the callback-style RPC transport, the
//! factory that builds it for an endpoint, and the recurring timer.

use parking_lot::Mutex;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Endpoint, SessionError, TransportError};

/// Completion callback handed to a transport call. Invoked at most once.
pub type Callback<T> = Box<dyn FnOnce(Result<T, TransportError>) + Send + 'static>;

/// Callback-style RPC transport - outbound port.
///
/// Each call either returns `Ok(())` and later invokes `done` with the
/// outcome, or refuses synchronously with `Err` and never invokes it.
pub trait Web3Transport: Send + Sync {
    /// Version of the client library behind this transport.
    fn api_version(&self) -> &str;

    /// Node software version.
    fn node_version(&self, done: Callback<String>) -> Result<(), TransportError>;

    /// Network identifier.
    fn network_version(&self, done: Callback<String>) -> Result<(), TransportError>;

    /// Ethereum protocol version.
    fn protocol_version(&self, done: Callback<String>) -> Result<(), TransportError>;

    /// Messaging layer version. Most nodes do not implement it.
    fn whisper_version(&self, done: Callback<String>) -> Result<(), TransportError>;

    /// Accounts exposed by the node, in node order.
    fn accounts(&self, done: Callback<Vec<String>>) -> Result<(), TransportError>;

    /// Human-readable identity for logs.
    fn describe(&self) -> String {
        "transport".to_string()
    }
}

/// Builds a transport bound to a resolved endpoint - outbound port.
pub trait TransportFactory: Send + Sync {
    /// Construct the transport. No I/O is performed.
    fn build(&self, endpoint: &Endpoint) -> Result<Arc<dyn Web3Transport>, SessionError>;
}

/// Factory that hands out one pre-built transport for every endpoint.
pub struct FixedTransportFactory {
    transport: Arc<dyn Web3Transport>,
    built_for: Mutex<Vec<Endpoint>>,
}

impl FixedTransportFactory {
    /// Wrap an existing transport.
    pub fn new(transport: Arc<dyn Web3Transport>) -> Self {
        Self {
            transport,
            built_for: Mutex::new(Vec::new()),
        }
    }

    /// Endpoints this factory was asked to build for.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.built_for.lock().clone()
    }
}

impl TransportFactory for FixedTransportFactory {
    fn build(&self, endpoint: &Endpoint) -> Result<Arc<dyn Web3Transport>, SessionError> {
        self.built_for.lock().push(endpoint.clone());
        Ok(Arc::clone(&self.transport))
    }
}

/// Future returned by a timer tick.
pub type TickFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Tick handler. Called once per period; the returned future is awaited
/// before the next tick is considered.
pub type OnTick = Arc<dyn Fn() -> TickFuture + Send + Sync + 'static>;

/// Named timers with explicit cancellation - outbound port.
pub trait TimerService: Send + Sync {
    /// Start a timer. A running timer with the same name is cancelled first.
    fn create_timer(&self, name: &str, interval: Duration, recurring: bool, on_tick: OnTick);

    /// Stop a timer. Returns false if no timer had that name. A tick that is
    /// already executing completes.
    fn cancel(&self, name: &str) -> bool;

    /// True while the named timer can still tick.
    fn is_active(&self, name: &str) -> bool;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scripted reply of a mock transport call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockReply<T> {
    /// Invoke the callback with a value.
    Value(T),
    /// Invoke the callback with an error.
    Fail(TransportError),
    /// Refuse synchronously; the callback is never invoked.
    Refuse(TransportError),
    /// Drop the callback without invoking it.
    Drop,
    /// Keep the callback without ever invoking it (a node that never answers).
    Hang,
}

impl<T: Clone + Send + 'static> MockReply<T> {
    /// `Hang` replies are parked by [`MockTransport`] before reaching here.
    fn deliver(&self, done: Callback<T>) -> Result<(), TransportError> {
        match self {
            MockReply::Value(value) => {
                done(Ok(value.clone()));
                Ok(())
            }
            MockReply::Fail(error) => {
                done(Err(error.clone()));
                Ok(())
            }
            MockReply::Refuse(error) => Err(error.clone()),
            MockReply::Drop | MockReply::Hang => Ok(()),
        }
    }
}

/// Replies a [`MockTransport`] gives, per query.
#[derive(Clone, Debug)]
pub struct MockScript {
    /// `node_version` reply.
    pub node: MockReply<String>,
    /// `network_version` reply.
    pub network: MockReply<String>,
    /// `protocol_version` reply.
    pub protocol: MockReply<String>,
    /// `whisper_version` reply.
    pub whisper: MockReply<String>,
    /// `accounts` reply.
    pub accounts: MockReply<Vec<String>>,
}

impl Default for MockScript {
    fn default() -> Self {
        Self {
            node: MockReply::Value("v1".to_string()),
            network: MockReply::Value("42".to_string()),
            protocol: MockReply::Value("eth1".to_string()),
            whisper: MockReply::Fail(TransportError::Rpc {
                code: -32601,
                message: "method not found".to_string(),
            }),
            accounts: MockReply::Value(vec!["0xABC".to_string()]),
        }
    }
}

/// Mock transport for testing. Replies can be changed while a session runs.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<MockScript>,
    calls: AtomicUsize,
    parked: Mutex<Vec<Box<dyn Any + Send>>>,
}

/// Client API version reported by [`MockTransport`].
pub const MOCK_API_VERSION: &str = "mock-0.1";

impl MockTransport {
    /// Mock with the given replies.
    pub fn new(script: MockScript) -> Self {
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
            parked: Mutex::new(Vec::new()),
        }
    }

    /// Change the replies.
    pub fn update(&self, f: impl FnOnce(&mut MockScript)) {
        f(&mut self.script.lock());
    }

    /// Number of calls issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Callbacks held by `Hang` replies.
    pub fn parked_count(&self) -> usize {
        self.parked.lock().len()
    }

    fn answer<T: Clone + Send + 'static>(
        &self,
        pick: impl FnOnce(&MockScript) -> MockReply<T>,
        done: Callback<T>,
    ) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = pick(&self.script.lock());
        match reply {
            MockReply::Hang => {
                self.parked.lock().push(Box::new(done));
                Ok(())
            }
            other => other.deliver(done),
        }
    }
}

impl Web3Transport for MockTransport {
    fn api_version(&self) -> &str {
        MOCK_API_VERSION
    }

    fn node_version(&self, done: Callback<String>) -> Result<(), TransportError> {
        self.answer(|s| s.node.clone(), done)
    }

    fn network_version(&self, done: Callback<String>) -> Result<(), TransportError> {
        self.answer(|s| s.network.clone(), done)
    }

    fn protocol_version(&self, done: Callback<String>) -> Result<(), TransportError> {
        self.answer(|s| s.protocol.clone(), done)
    }

    fn whisper_version(&self, done: Callback<String>) -> Result<(), TransportError> {
        self.answer(|s| s.whisper.clone(), done)
    }

    fn accounts(&self, done: Callback<Vec<String>>) -> Result<(), TransportError> {
        self.answer(|s| s.accounts.clone(), done)
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
