//! Domain types for the gateway.
//!
//! Configuration, connection identity, the method table and error handling.

pub mod config;
pub mod connection;
pub mod error;
pub mod methods;

// Re-exports for convenience
pub use config::{BusConfig, ConfigError, GatewayConfig, SubscriptionConfig, WebSocketConfig};
pub use connection::ConnectionId;
pub use error::{codes, ApiError, ApiResult, GatewayError};
pub use methods::{Method, NOTIFICATION_METHOD};
