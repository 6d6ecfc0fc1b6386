//! # Web3 Session Probe
//!
//! Connects to the configured node, tries to authenticate, prints what it
//! learned and then follows the session status until Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`WEB3_LOG_LEVEL`, `WEB3_JSON_LOGS`)
//! 2. Load settings from `WEB3_*` variables
//! 3. Initialize the service and connect
//! 4. Authenticate (a node without accounts only logs a warning)
//! 5. Report status changes until Ctrl+C

use anyhow::{Context, Result};
use tracing::{info, warn};

use web3_session::{HostEnvironment, SessionConfig, Settings, Web3Service, Web3SessionApi};
use web3_telemetry::{init_logging, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let telemetry = TelemetryConfig::from_env();
    let _logging = init_logging(&telemetry).context("failed to initialize logging")?;

    // Load configuration
    let settings = Settings::from_env().context("invalid WEB3_* settings")?;
    info!("[web3] Settings: {:?}", settings);

    let service = Web3Service::with_defaults(SessionConfig::default());
    service
        .initialize(Some(settings), HostEnvironment::default())
        .context("failed to initialize web3 service")?;

    let version = service.connect().await.context("failed to connect")?;
    println!("node:     {}", version.node.as_deref().unwrap_or("-"));
    println!("network:  {}", version.network.as_deref().unwrap_or("-"));
    println!("ethereum: {}", version.ethereum.as_deref().unwrap_or("-"));
    println!("whisper:  {}", version.whisper.as_deref().unwrap_or("-"));

    match service.authenticate().await {
        Ok(account) => println!("account:  {}", account),
        Err(e) => warn!("[web3] Continuing unauthenticated: {}", e),
    }

    let mut status = service.subscribe();
    info!("[web3] Watching session status. Press Ctrl+C to stop.");
    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                println!("status:   {}", current);
                if !current.is_connected() {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl+C")?;
                break;
            }
        }
    }

    service.disconnect().await;
    Ok(())
}
