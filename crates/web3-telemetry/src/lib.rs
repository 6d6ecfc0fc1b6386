//! # Web3 Telemetry
//!
//! Logging setup shared by the session library and its CLI probe.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use web3_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_logging(&config).expect("Failed to init logging");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `web3-session` | Service name attached to the startup event |
//! | `WEB3_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `WEB3_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |
//! | `WEB3_JSON_LOGS` | `false` | JSON formatted logs |

#![warn(missing_docs)]

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{init_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The level filter could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed.
    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}
