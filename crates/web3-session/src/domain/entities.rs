//! # Domain Entities
//!
//! The session state machine. `Authenticated` carries its own version
//! record, so an authenticated session without a connection cannot be
//! represented.

use super::errors::SessionError;
use super::value_objects::{SessionStatus, VersionInfo};

/// Connection/authentication facts known about the node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No guarantee. `last_known` keeps the previous version record with the
    /// network field cleared.
    Disconnected {
        /// Versions observed by the last successful connect, network cleared.
        last_known: VersionInfo,
    },
    /// Version queries succeeded.
    Connected {
        /// Versions observed by the last successful connect.
        version: VersionInfo,
    },
    /// Connected, with an account in use.
    Authenticated {
        /// Versions observed by the last successful connect.
        version: VersionInfo,
        /// First account reported by the node.
        account: String,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Disconnected {
            last_known: VersionInfo::default(),
        }
    }
}

impl SessionState {
    /// Guarantee level of this state.
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Disconnected { .. } => SessionStatus::Disconnected,
            SessionState::Connected { .. } => SessionStatus::Connected,
            SessionState::Authenticated { .. } => SessionStatus::Authenticated,
        }
    }

    /// The version record (network cleared when disconnected).
    pub fn version(&self) -> &VersionInfo {
        match self {
            SessionState::Disconnected { last_known } => last_known,
            SessionState::Connected { version } => version,
            SessionState::Authenticated { version, .. } => version,
        }
    }

    /// Network identifier recorded at connect time.
    pub fn network(&self) -> Option<&str> {
        self.version().network.as_deref()
    }

    /// Active account, if authenticated.
    pub fn account(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { account, .. } => Some(account),
            _ => None,
        }
    }

    /// Record a successful connect. An authenticated session keeps its
    /// account. Returns true if the state changed.
    pub fn connect(&mut self, version: VersionInfo) -> bool {
        let next = match std::mem::take(self) {
            SessionState::Authenticated { account, .. } => {
                SessionState::Authenticated { version, account }
            }
            _ => SessionState::Connected { version },
        };
        let changed = *self != next;
        *self = next;
        changed
    }

    /// Record the first account reported by the node.
    ///
    /// # Errors
    /// - `NotConnected` when called on a disconnected session
    pub fn authenticate(&mut self, account: String) -> Result<bool, SessionError> {
        let next = match self {
            SessionState::Disconnected { .. } => return Err(SessionError::NotConnected),
            SessionState::Connected { version } | SessionState::Authenticated { version, .. } => {
                SessionState::Authenticated {
                    version: version.clone(),
                    account,
                }
            }
        };
        let changed = *self != next;
        *self = next;
        Ok(changed)
    }

    /// Drop to `Disconnected`, clearing the network and any account.
    /// Returns true if a guarantee was lost.
    pub fn disconnect(&mut self) -> bool {
        if let SessionState::Disconnected { .. } = self {
            return false;
        }
        let last_known = self.version().without_network();
        *self = SessionState::Disconnected { last_known };
        true
    }

    /// Drop from `Authenticated` to `Connected`. Returns true if the
    /// account was cleared.
    pub fn deauthenticate(&mut self) -> bool {
        match std::mem::take(self) {
            SessionState::Authenticated { version, .. } => {
                *self = SessionState::Connected { version };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }
}
