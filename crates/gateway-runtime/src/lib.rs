//! # Gateway Runtime
//!
//! Startup plumbing for the `bus-jsonrpc` executable.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line and load the configuration file
//! 2. Open the bus and write the configured seed
//! 3. Build the gateway service and bind the listener
//! 4. Serve until SIGTERM or Ctrl-C, then shut down gracefully

pub mod bootstrap;
pub mod cli;
pub mod signal;

pub use cli::Cli;

use anyhow::{Context, Result};
use bus_gateway::GatewayService;
use std::future::Future;
use tracing::info;

/// Run the gateway until `shutdown` resolves.
pub async fn run<F>(cli: &Cli, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let config = cli.load_config();
    info!(
        config = %cli.config.display(),
        host = %config.host,
        port = config.port,
        "Starting bus gateway"
    );

    let bus = bootstrap::open_bus(&config.bus)?;
    let service = GatewayService::new(config, bus).context("gateway setup failed")?;
    let listener = service.bind().await.context("listener setup failed")?;

    service.run(listener, shutdown).await?;
    Ok(())
}
