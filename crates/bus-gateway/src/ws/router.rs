//! Notification router.
//!
//! The bus invokes its callback on its own delivery task. That callback only
//! enqueues; the event pump drains the queue, resolves subscribers through
//! the registry and pushes one notification frame per subscriber onto the
//! connection hub. Nothing here writes to a socket directly.

use crate::codec;
use crate::domain::methods::NOTIFICATION_METHOD;
use crate::middleware::GatewayMetrics;
use crate::ws::hub::ConnectionHub;
use crate::ws::registry::SubscriptionRegistry;
use bus_client::EventHandler;
use bus_types::BusEvent;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Receiving end of the bus callback queue
pub type EventQueue = mpsc::UnboundedReceiver<BusEvent>;

/// Create the bus callback and the queue it feeds.
pub fn event_channel() -> (EventHandler, EventQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler: EventHandler = Arc::new(move |event: BusEvent| {
        if let Err(e) = tx.send(event) {
            debug!(event_name = %e.0.name, "Event pump stopped, dropping event");
        }
    });
    (handler, rx)
}

/// Build the `bus_event` notification for an event.
#[must_use]
pub fn notification(event: &BusEvent) -> Value {
    let data = event.value().map_or(Value::Null, codec::to_json);
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": NOTIFICATION_METHOD,
        "params": {
            "eventName": event.name,
            "type": event.kind.as_str(),
            "data": data,
        }
    })
}

/// Fans bus events out to subscribed connections
#[derive(Clone)]
pub struct NotificationRouter {
    registry: Arc<SubscriptionRegistry>,
    hub: Arc<ConnectionHub>,
    metrics: Arc<GatewayMetrics>,
}

impl NotificationRouter {
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        hub: Arc<ConnectionHub>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry,
            hub,
            metrics,
        }
    }

    /// Deliver one event. Returns the number of frames queued.
    ///
    /// Delivery failures are logged and counted, never retried.
    pub async fn route(&self, event: &BusEvent) -> usize {
        self.metrics.record_bus_event();

        let targets = self.registry.resolve(&event.name).await;
        if targets.is_empty() {
            debug!(event_name = %event.name, "No subscribers for event");
            return 0;
        }

        let frame = notification(event).to_string();
        let mut delivered = 0;

        for connection in targets {
            match self.hub.send(&connection, frame.clone()) {
                Ok(()) => {
                    delivered += 1;
                    self.metrics.record_notification_sent();
                }
                Err(e) => {
                    self.metrics.record_notification_dropped();
                    warn!(
                        event_name = %event.name,
                        connection_id = %connection,
                        error = %e,
                        "Failed to deliver notification"
                    );
                }
            }
        }

        debug!(
            event_name = %event.name,
            kind = %event.kind,
            delivered = delivered,
            "Event routed"
        );
        delivered
    }

    /// Drain `queue` until every sender is gone.
    pub async fn run(self, mut queue: EventQueue) {
        while let Some(event) = queue.recv().await {
            self.route(&event).await;
        }
        info!("Event pump stopped");
    }

    pub fn spawn(self, queue: EventQueue) -> JoinHandle<()> {
        tokio::spawn(self.run(queue))
    }
}
