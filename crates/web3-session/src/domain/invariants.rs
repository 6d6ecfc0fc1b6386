//! # Domain Invariants
//!
//! Constants and the two liveness predicates the health checks evaluate.

use super::entities::SessionState;

/// Endpoint used when the caller supplies no provider.
pub const DEFAULT_PROVIDER_URL: &str = "https://sai-service.makerdao.com/node";

/// Loopback endpoint reserved for test transports.
pub const TEST_PROVIDER_URL: &str = "http://127.0.0.1:2000";

/// Timer name of the connection health check.
pub const CONNECTION_CHECK_TIMER: &str = "web3CheckConnectionStatus";

/// Timer name of the authentication health check.
pub const AUTHENTICATION_CHECK_TIMER: &str = "web3CheckAuthenticationStatus";

/// Default connection health-check period in milliseconds.
pub const DEFAULT_CONNECTION_CHECK_MS: u64 = 500;

/// Default authentication health-check period in milliseconds.
pub const DEFAULT_AUTHENTICATION_CHECK_MS: u64 = 300;

/// Invariant: a session stays pinned to the network observed at connect.
///
/// Holds iff the node reports a network and it equals the recorded one.
/// A different network is a failure, not a new success.
pub fn invariant_same_network(observed: Option<&str>, recorded: Option<&str>) -> bool {
    match (observed, recorded) {
        (Some(observed), Some(recorded)) => observed == recorded,
        _ => false,
    }
}

/// Invariant: the first reported account is still the recorded account.
///
/// Later entries are never consulted.
pub fn invariant_same_account(accounts: &[String], recorded: Option<&str>) -> bool {
    match (accounts.first(), recorded) {
        (Some(first), Some(recorded)) => first == recorded,
        _ => false,
    }
}

/// Invariant: the network is known exactly while connected.
pub fn invariant_network_tracks_connection(state: &SessionState) -> bool {
    state.network().is_some() == state.status().is_connected()
}
