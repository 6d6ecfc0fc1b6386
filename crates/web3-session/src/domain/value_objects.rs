//! # Domain Value Objects
//!
//! Immutable value types: the version record, provider descriptors,
//! resolved endpoints and the derived session status.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::invariants::DEFAULT_PROVIDER_URL;

/// Versions reported by the node. `None` means unknown.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    /// Version of the client library driving the transport.
    pub api: Option<String>,
    /// Node software version (`web3_clientVersion`).
    pub node: Option<String>,
    /// Network identifier (`net_version`).
    pub network: Option<String>,
    /// Ethereum protocol version (`eth_protocolVersion`).
    pub ethereum: Option<String>,
    /// Messaging layer version; absent on most nodes.
    pub whisper: Option<String>,
}

impl VersionInfo {
    /// Copy of this record with the network field cleared.
    pub fn without_network(&self) -> Self {
        Self {
            network: None,
            ..self.clone()
        }
    }
}

/// Declarative description of where the node lives.
///
/// Deserialized from `{"type": "...", ...}`. Unknown tags become
/// [`ProviderDescriptor::Unsupported`], which endpoint resolution rejects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderDescriptor {
    /// Plain HTTP endpoint.
    #[serde(alias = "http")]
    Direct {
        /// Endpoint URL, used verbatim.
        url: String,
    },
    /// Hosted gateway addressed by network name and access key.
    #[serde(alias = "infura")]
    Hosted {
        /// Network name, e.g. `mainnet` or `kovan`.
        network: String,
        /// Gateway access key.
        #[serde(rename = "accessKey", alias = "infuraApiKey")]
        access_key: String,
    },
    /// Local loopback endpoint reserved for test nodes.
    Test,
    /// Any tag this crate does not recognise.
    #[serde(other)]
    Unsupported,
}

impl Default for ProviderDescriptor {
    fn default() -> Self {
        ProviderDescriptor::Direct {
            url: DEFAULT_PROVIDER_URL.to_string(),
        }
    }
}

impl ProviderDescriptor {
    /// Short name of the descriptor kind, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderDescriptor::Direct { .. } => "direct",
            ProviderDescriptor::Hosted { .. } => "hosted",
            ProviderDescriptor::Test => "test",
            ProviderDescriptor::Unsupported => "unsupported",
        }
    }
}

/// Concrete transport address derived from a [`ProviderDescriptor`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    url: String,
}

impl Endpoint {
    /// Wrap a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Guarantee level currently held by a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No guarantee.
    Disconnected,
    /// The transport answers version queries.
    Connected,
    /// Connected, and the transport exposes an account.
    Authenticated,
}

impl SessionStatus {
    /// Connected or better.
    pub fn is_connected(self) -> bool {
        !matches!(self, SessionStatus::Disconnected)
    }

    /// Authenticated.
    pub fn is_authenticated(self) -> bool {
        matches!(self, SessionStatus::Authenticated)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Disconnected => "Disconnected",
            SessionStatus::Connected => "Connected",
            SessionStatus::Authenticated => "Authenticated",
        };
        f.write_str(name)
    }
}
