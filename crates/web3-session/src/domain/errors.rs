//! # Domain Errors
//!
//! Error taxonomy for the session manager:
//! configuration problems (fatal to initialize), transport failures (logged
//! at the connect/authenticate boundary) and accessor preconditions.

use thiserror::Error;

/// Failure reported by, or while talking to, the RPC transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the node
        message: String,
    },

    /// The HTTP exchange itself failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The transport refused the call before issuing it.
    #[error("Call rejected: {0}")]
    Rejected(String),

    /// The transport dropped the callback without invoking it.
    #[error("Transport released the callback without a result")]
    CallbackDropped,

    /// No result arrived within the configured request timeout.
    #[error("Request timed out after {0} ms")]
    TimedOut(u64),
}

/// Configuration errors. Never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The provider descriptor names a kind this crate cannot build.
    #[error("Illegal web3 provider type: {0}")]
    IllegalProviderType(String),

    /// A required setting is absent.
    #[error("Missing setting: {0}")]
    MissingValue(&'static str),

    /// A setting could not be parsed.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Setting name
        key: &'static str,
        /// Offending raw value
        value: String,
    },

    /// A settings document could not be parsed.
    #[error("Invalid settings document: {0}")]
    Document(String),
}

/// Errors surfaced by the session manager.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Invalid configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A transport query failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The connected guarantee does not hold.
    #[error("Cannot resolve network ID. Are you connected?")]
    NotConnected,

    /// The authenticated guarantee does not hold.
    #[error("Default account is unavailable when not authenticated.")]
    NotAuthenticated,

    /// The node exposes no usable account.
    #[error("Web3 is not authenticated")]
    NoAccounts,

    /// The stored network identifier is not an integer.
    #[error("Cannot parse network ID: {0}")]
    InvalidNetworkId(String),

    /// `initialize` has not run yet.
    #[error("Web3 service is not initialized")]
    NotInitialized,

    /// `initialize` already ran for this instance.
    #[error("Web3 service is already initialized")]
    AlreadyInitialized,

    /// The configured private key cannot be used.
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

impl SessionError {
    /// True for errors raised by the accessor preconditions.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SessionError::NotConnected | SessionError::NotAuthenticated
        )
    }
}
