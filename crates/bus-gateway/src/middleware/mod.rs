//! HTTP middleware and gateway counters.

pub mod metrics;
pub mod tracing;

pub use metrics::{GatewayMetrics, MetricsSnapshot};
pub use tracing::TracingLayer;
