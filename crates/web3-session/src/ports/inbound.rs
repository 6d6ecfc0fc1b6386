//! # Inbound Ports
//!
//! API trait defining what the session manager can do.

use async_trait::async_trait;

use crate::domain::{SessionError, SessionStatus, VersionInfo};

/// Web3 session API - inbound port.
#[async_trait]
pub trait Web3SessionApi: Send + Sync {
    /// Query node, network, protocol and messaging versions concurrently
    /// and enter the connected state.
    ///
    /// Failures are logged; the session keeps its previous state.
    async fn connect(&self) -> Result<VersionInfo, SessionError>;

    /// Query the account list and enter the authenticated state with the
    /// first account.
    ///
    /// Failures are logged; the session keeps its previous state.
    async fn authenticate(&self) -> Result<String, SessionError>;

    /// Drop every guarantee and stop both health checks.
    async fn disconnect(&self);

    /// Drop the authenticated guarantee and stop its health check.
    async fn deauthenticate(&self);

    /// The version record.
    fn version(&self) -> VersionInfo;

    /// Network identifier as an integer.
    ///
    /// # Errors
    /// - `NotConnected` when no network is recorded
    fn network_id(&self) -> Result<u64, SessionError>;

    /// The active account.
    ///
    /// # Errors
    /// - `NotAuthenticated` when no account is active
    fn default_account(&self) -> Result<String, SessionError>;

    /// Current guarantee level.
    fn status(&self) -> SessionStatus;
}
