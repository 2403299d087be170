//! Gateway configuration with validation.
//!
//! Loaded from a JSON file. Loading is lenient: an unreadable file, a bad
//! field or a broken section falls back to defaults with a warning, so the
//! gateway still comes up.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SUBSCRIPTION_CAPACITY: usize = 100;
pub const DEFAULT_SUBSCRIBE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;
pub const DEFAULT_OUTBOUND_BUFFER: usize = 256;
pub const DEFAULT_COMPONENT_NAME: &str = "bus-jsonrpc";

/// Main gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// TLS toggle. TLS is terminated in front of the gateway; see
    /// [`crate::service::GatewayService::new`].
    pub ssl_enabled: bool,
    pub subscriptions: SubscriptionConfig,
    pub websocket: WebSocketConfig,
    pub bus: BusConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ssl_enabled: false,
            subscriptions: SubscriptionConfig::default(),
            websocket: WebSocketConfig::default(),
            bus: BusConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load from a JSON file, falling back to defaults on any read or
    /// parse failure.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot read config file, using default configuration"
                );
                return Self::default();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(root) => Self::from_json(&root),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot parse config file, using default configuration"
                );
                Self::default()
            }
        }
    }

    /// Build from an already parsed document, field by field.
    ///
    /// Fields of the wrong JSON type are ignored. A port outside `0..=65535`
    /// resets to [`DEFAULT_PORT`].
    pub fn from_json(root: &Value) -> Self {
        let mut config = Self::default();

        let Some(obj) = root.as_object() else {
            warn!("Config root is not an object, using default configuration");
            return config;
        };

        if let Some(host) = obj.get("host").and_then(Value::as_str) {
            config.host = host.to_string();
        }

        if let Some(port) = obj.get("port").and_then(Value::as_i64) {
            config.port = u16::try_from(port).unwrap_or_else(|_| {
                warn!(port = port, fallback = DEFAULT_PORT, "Invalid port in config, using default");
                DEFAULT_PORT
            });
        }

        if let Some(ssl) = obj.get("ssl_enabled").and_then(Value::as_bool) {
            config.ssl_enabled = ssl;
        }

        config.subscriptions = section(obj, "subscriptions", config.subscriptions);
        config.websocket = section(obj, "websocket", config.websocket);
        config.bus = section(obj, "bus", config.bus);

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host cannot be empty".into()));
        }

        if self.subscriptions.capacity == 0 {
            return Err(ConfigError::InvalidLimit(
                "subscriptions.capacity cannot be 0".into(),
            ));
        }

        if self.websocket.max_message_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "websocket.max_message_size cannot be 0".into(),
            ));
        }

        if self.websocket.outbound_buffer == 0 {
            return Err(ConfigError::InvalidLimit(
                "websocket.outbound_buffer cannot be 0".into(),
            ));
        }

        if self.bus.component_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "bus.component_name cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn section<T: DeserializeOwned>(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    fallback: T,
) -> T {
    match obj.get(key) {
        None => fallback,
        Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
            warn!(section = key, error = %e, "Invalid config section, using defaults");
            fallback
        }),
    }
}

/// Subscription registry limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Process-wide cap on (event, connection) pairs
    pub capacity: usize,
    /// Used when `event_subscribe` carries no timeout
    pub default_timeout_secs: u64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SUBSCRIPTION_CAPACITY,
            default_timeout_secs: DEFAULT_SUBSCRIBE_TIMEOUT_SECS,
        }
    }
}

/// WebSocket transport limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Largest inbound frame accepted, in bytes
    pub max_message_size: usize,
    /// Per-connection outbound queue depth
    pub outbound_buffer: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
        }
    }
}

/// Bus connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Name the gateway registers on the bus with
    pub component_name: String,
    /// Data elements written into an in-process bus at startup
    pub seed: serde_json::Map<String, Value>,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            component_name: DEFAULT_COMPONENT_NAME.to_string(),
            seed: serde_json::Map::new(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
