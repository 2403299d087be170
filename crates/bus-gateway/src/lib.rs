//! Bus Gateway - JSON-RPC 2.0 over WebSocket for the typed data bus.
//!
//! Clients read and write bus data points and subscribe to bus events over
//! a single WebSocket connection.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          BUS GATEWAY                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ws://host:port/  (subprotocol "jsonrpc")        /health        │
//! │          │                                                       │
//! │  ┌───────┴────────┐   response    ┌──────────────────┐           │
//! │  │  reader loop   │──────────────►│ outbound queue   │──► writer │
//! │  │ (per conn)     │               │ (ConnectionHub)  │   task    │
//! │  └───────┬────────┘               └────────▲─────────┘           │
//! │          │ dispatch                        │ bus_event           │
//! │  ┌───────┴────────┐               ┌────────┴─────────┐           │
//! │  │ RpcDispatcher  │──subscribe───►│ Subscription     │           │
//! │  │ bus_* event_*  │               │ Registry         │           │
//! │  └───────┬────────┘               └────────▲─────────┘           │
//! │          │ get / set                       │ resolve             │
//! │          │                        ┌────────┴─────────┐           │
//! │          │                        │ Notification     │◄── queue  │
//! │          │                        │ Router (pump)    │           │
//! │          │                        └──────────────────┘     ▲     │
//! └──────────┼─────────────────────────────────────────────────┼─────┘
//!            ▼                                                 │
//!                             Data Bus  ──── event callback ───┘
//! ```
//!
//! # Methods
//!
//! | Method              | Legacy alias            | Result        |
//! |---------------------|-------------------------|---------------|
//! | `bus_get`           | `rbus_get`              | `{path: value}` |
//! | `bus_set`           | `rbus_set`              | `true`        |
//! | `event_subscribe`   | `rbusEvent_Subscribe`   | `true`        |
//! | `event_unsubscribe` | `rbusEvent_Unsubscribe` | `true`        |
//!
//! Events arrive as `bus_event` notifications.
//!
//! # Usage
//!
//! ```ignore
//! use bus_gateway::{GatewayConfig, GatewayService};
//!
//! let service = GatewayService::new(GatewayConfig::default(), bus)?;
//! let listener = service.bind().await?;
//! service.run(listener, shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod codec;
pub mod domain;
pub mod middleware;
pub mod rpc;
pub mod service;
pub mod ws;

// Re-exports for public API
pub use domain::config::GatewayConfig;
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use domain::methods::{Method, NOTIFICATION_METHOD};
pub use middleware::GatewayMetrics;
pub use service::GatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
