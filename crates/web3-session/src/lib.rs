//! # Web3 Session
//!
//! Connection/authentication lifecycle for a remote Ethereum node reached
//! through a callback-style RPC transport.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Turn an unreliable callback channel into a small state machine with two
//! guarantees that callers can read synchronously:
//! - **Connected**: the node answers version queries
//! - **Authenticated**: the node exposes at least one account
//!
//! Each guarantee is watched by its own recurring health check, which
//! downgrades the session when the guarantee silently stops holding.
//!
//! ## Health Checks
//!
//! | Timer | Default period | Holds iff |
//! |-------|----------------|-----------|
//! | `web3CheckConnectionStatus` | 500 ms | node answers and reports the network seen at connect |
//! | `web3CheckAuthenticationStatus` | 300 ms | first reported account equals the recorded one |
//!
//! A lost guarantee is never re-established automatically.
//!
//! ## Module Structure
//!
//! ```text
//! web3-session/
//! ├── domain/          # SessionState, VersionInfo, ProviderDescriptor, errors
//! ├── ports/           # API trait (inbound) + transport/timer traits (outbound)
//! ├── adapters/        # Callback adapter, resolver, HTTP transport, signer, timers
//! ├── application/     # Web3Service orchestrating everything
//! └── config.rs        # Settings + SessionConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    resolve, settle, settle_within, HttpTransport, HttpTransportFactory, LocalSigner, OnError,
    Provider, Settled, Signer, TokioTimerService, CLIENT_API_VERSION,
};
pub use application::{HealthChecks, HostEnvironment, Web3Service};
pub use config::{SessionConfig, Settings};
pub use domain::{
    invariant_network_tracks_connection, invariant_same_account, invariant_same_network,
    ConfigError, Endpoint, ProviderDescriptor, SessionError, SessionState, SessionStatus,
    TransportError, VersionInfo, AUTHENTICATION_CHECK_TIMER, CONNECTION_CHECK_TIMER,
    DEFAULT_PROVIDER_URL, TEST_PROVIDER_URL,
};
pub use ports::{
    Callback, FixedTransportFactory, MockReply, MockScript, MockTransport, OnTick, TickFuture,
    TimerService, TransportFactory, Web3SessionApi, Web3Transport,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
