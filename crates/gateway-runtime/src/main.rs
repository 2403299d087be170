//! `bus-jsonrpc` entry point.

use std::process::ExitCode;

use clap::Parser;
use gateway_runtime::{signal::shutdown_signal, Cli};
use gateway_telemetry::{init_logging, TelemetryConfig};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&TelemetryConfig::from_env()) {
        eprintln!("bus-jsonrpc: {e}");
        return ExitCode::FAILURE;
    }

    match gateway_runtime::run(&cli, shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Gateway failed");
            ExitCode::FAILURE
        }
    }
}
