//! RPC method handlers for the JSON-RPC API.

pub mod bus;
pub mod dispatcher;
pub mod event;
pub mod response;

pub use bus::BusRpc;
pub use dispatcher::RpcDispatcher;
pub use event::EventRpc;
pub use response::FALLBACK_RESPONSE;

use crate::middleware::GatewayMetrics;
use crate::ws::hub::ConnectionHub;
use crate::ws::registry::SubscriptionRegistry;
use bus_client::BusClient;
use std::sync::Arc;
use std::time::Duration;

/// All RPC handlers
pub struct RpcHandlers {
    pub bus: BusRpc,
    pub event: EventRpc,
}

impl RpcHandlers {
    pub fn new(
        bus: Arc<dyn BusClient>,
        registry: Arc<SubscriptionRegistry>,
        hub: Arc<ConnectionHub>,
        metrics: Arc<GatewayMetrics>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            bus: BusRpc::new(bus),
            event: EventRpc::new(registry, hub, metrics, default_timeout),
        }
    }
}
