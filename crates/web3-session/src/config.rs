//! # Web3 Session Configuration
//!
//! `Settings` chooses the node and signing identity; `SessionConfig` tunes
//! the health-check periods.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::domain::{
    ConfigError, ProviderDescriptor, DEFAULT_AUTHENTICATION_CHECK_MS,
    DEFAULT_CONNECTION_CHECK_MS, DEFAULT_PROVIDER_URL,
};

/// Caller-supplied settings for `initialize`.
///
/// Missing fields take their defaults one by one.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Prefer a transport injected by the host environment.
    pub use_preset_provider: bool,
    /// Where the node lives.
    pub provider: ProviderDescriptor,
    /// Hex private key for a local signing identity.
    pub private_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_preset_provider: true,
            provider: ProviderDescriptor::default(),
            private_key: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("use_preset_provider", &self.use_preset_provider)
            .field("provider", &self.provider)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Settings {
    /// Settings to use when the caller may have supplied none.
    pub fn normalize(settings: Option<Settings>) -> Self {
        settings.unwrap_or_default()
    }

    /// Parse a JSON settings document.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(document).map_err(|e| ConfigError::Document(e.to_string()))
    }

    /// Load from environment variables.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `WEB3_PROVIDER_TYPE` | `direct`/`http`, `hosted`/`infura` or `test` |
    /// | `WEB3_PROVIDER_URL` | URL of a direct provider |
    /// | `WEB3_NETWORK` | network name of a hosted provider |
    /// | `WEB3_ACCESS_KEY` | access key of a hosted provider |
    /// | `WEB3_PRIVATE_KEY` | hex private key |
    /// | `WEB3_USE_PRESET_PROVIDER` | `true`/`false` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`], reading through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut settings = Settings::default();

        if let Some(raw) = get("WEB3_USE_PRESET_PROVIDER") {
            settings.use_preset_provider =
                parse_flag(&raw).ok_or(ConfigError::InvalidValue {
                    key: "WEB3_USE_PRESET_PROVIDER",
                    value: raw,
                })?;
        }

        let url = get("WEB3_PROVIDER_URL");
        settings.provider = match get("WEB3_PROVIDER_TYPE") {
            None => match url {
                Some(url) => ProviderDescriptor::Direct { url },
                None => ProviderDescriptor::default(),
            },
            Some(kind) => match kind.trim().to_ascii_lowercase().as_str() {
                "direct" | "http" => ProviderDescriptor::Direct {
                    url: url.unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string()),
                },
                "hosted" | "infura" => ProviderDescriptor::Hosted {
                    network: get("WEB3_NETWORK").ok_or(ConfigError::MissingValue("WEB3_NETWORK"))?,
                    access_key: get("WEB3_ACCESS_KEY")
                        .ok_or(ConfigError::MissingValue("WEB3_ACCESS_KEY"))?,
                },
                "test" => ProviderDescriptor::Test,
                _ => return Err(ConfigError::IllegalProviderType(kind)),
            },
        };

        settings.private_key = get("WEB3_PRIVATE_KEY");

        Ok(settings)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Health-check timing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Connection health-check period in milliseconds.
    pub connection_check_ms: u64,

    /// Authentication health-check period in milliseconds.
    pub authentication_check_ms: u64,

    /// Deadline for a single transport query. `None` leaves it to the
    /// transport.
    pub request_timeout_ms: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connection_check_ms: DEFAULT_CONNECTION_CHECK_MS,
            authentication_check_ms: DEFAULT_AUTHENTICATION_CHECK_MS,
            request_timeout_ms: None,
        }
    }
}

impl SessionConfig {
    /// Create a config for testing (short periods, bounded queries).
    pub fn for_testing() -> Self {
        Self {
            connection_check_ms: 50,
            authentication_check_ms: 30,
            request_timeout_ms: Some(1_000),
        }
    }

    /// Reject periods the timer cannot schedule.
    ///
    /// # Errors
    /// - `InvalidValue` when either check period is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("connection_check_ms", self.connection_check_ms),
            ("authentication_check_ms", self.authentication_check_ms),
        ];
        for (key, ms) in periods {
            if ms == 0 {
                return Err(ConfigError::InvalidValue {
                    key,
                    value: ms.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Period of `web3CheckConnectionStatus`.
    pub fn connection_check_interval(&self) -> Duration {
        Duration::from_millis(self.connection_check_ms)
    }

    /// Period of `web3CheckAuthenticationStatus`.
    pub fn authentication_check_interval(&self) -> Duration {
        Duration::from_millis(self.authentication_check_ms)
    }

    /// Per-query deadline.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}
