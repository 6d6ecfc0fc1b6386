//! Provider Resolver
//!
//! Maps a [`ProviderDescriptor`] to a concrete [`Endpoint`], and bundles the
//! transport built for it into a [`Provider`] handle.

use std::fmt;
use std::sync::Arc;

use crate::domain::{ConfigError, Endpoint, ProviderDescriptor, TEST_PROVIDER_URL};
use crate::ports::Web3Transport;

/// Resolve a descriptor to an endpoint. Pure; no I/O.
///
/// # Errors
/// - `IllegalProviderType` for descriptors of an unrecognised kind
pub fn resolve(descriptor: &ProviderDescriptor) -> Result<Endpoint, ConfigError> {
    match descriptor {
        ProviderDescriptor::Direct { url } => Ok(Endpoint::new(url.clone())),
        ProviderDescriptor::Hosted {
            network,
            access_key,
        } => Ok(Endpoint::new(hosted_url(network, access_key))),
        ProviderDescriptor::Test => Ok(Endpoint::new(TEST_PROVIDER_URL)),
        ProviderDescriptor::Unsupported => Err(ConfigError::IllegalProviderType(
            descriptor.kind().to_string(),
        )),
    }
}

fn hosted_url(network: &str, access_key: &str) -> String {
    format!("https://{}.infura.io/{}", network, access_key)
}

/// Higher-level handle over the session's transport.
///
/// `endpoint` is `None` when the host environment injected the transport.
#[derive(Clone)]
pub struct Provider {
    transport: Arc<dyn Web3Transport>,
    endpoint: Option<Endpoint>,
}

impl Provider {
    /// Bundle a transport with the endpoint it was built for.
    pub fn new(transport: Arc<dyn Web3Transport>, endpoint: Option<Endpoint>) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// The shared transport.
    pub fn transport(&self) -> &Arc<dyn Web3Transport> {
        &self.transport
    }

    /// Resolved endpoint, if the transport was built from settings.
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// True if the transport came from the host environment.
    pub fn is_injected(&self) -> bool {
        self.endpoint.is_none()
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("transport", &self.transport.describe())
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
