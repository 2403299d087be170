//! Telemetry configuration from environment variables.

use std::env;

/// Default filter directive
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Directive that keeps the bus client library quiet unless asked for.
pub const BUS_CLIENT_DIRECTIVE: &str = "bus_client=error";

/// Configuration for gateway logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log filter, `EnvFilter` syntax (e.g. `info,bus_gateway=debug`)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to colour human-readable output
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "bus-jsonrpc".to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GATEWAY_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `GATEWAY_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `GATEWAY_LOG_ANSI`: Colour output (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: "bus-jsonrpc".to_string(),

            log_level: lookup("GATEWAY_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),

            json_logs: lookup("GATEWAY_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            ansi: lookup("GATEWAY_LOG_ANSI")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    /// The full filter directive, with the bus client quieted unless the
    /// configured level already says something about it.
    pub fn filter_directive(&self) -> String {
        if self.log_level.contains("bus_client") {
            self.log_level.clone()
        } else {
            format!("{},{}", self.log_level, BUS_CLIENT_DIRECTIVE)
        }
    }
}
