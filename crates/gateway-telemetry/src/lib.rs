//! # Gateway Telemetry
//!
//! Logging setup for the bus gateway binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gateway_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `GATEWAY_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `GATEWAY_LOG_ANSI` | `true` | Coloured output |

mod config;
mod logging;

pub use config::{TelemetryConfig, BUS_CLIENT_DIRECTIVE, DEFAULT_LOG_LEVEL};
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
