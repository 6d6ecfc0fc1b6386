//! # Adapters Layer (Hexagonal Architecture)
//!
//! Callback adaptation, endpoint resolution and the concrete collaborators
//! behind the outbound ports.

pub mod callback;
pub mod http_transport;
pub mod provider;
pub mod signer;
pub mod timer;

pub use callback::{settle, settle_within, OnError, Settled};
pub use http_transport::{HttpTransport, HttpTransportFactory, CLIENT_API_VERSION};
pub use provider::{resolve, Provider};
pub use signer::{LocalSigner, Signer};
pub use timer::TokioTimerService;
