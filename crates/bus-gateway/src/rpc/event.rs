//! Event methods: `event_subscribe` and `event_unsubscribe`.
//!
//! Subscriptions belong to the connection the request arrived on. A
//! connection joining a name another connection already watches gets its
//! own `initial_value` notification, like the first subscriber did.

use crate::domain::connection::ConnectionId;
use crate::domain::error::{ApiError, ApiResult};
use crate::middleware::GatewayMetrics;
use crate::ws::hub::ConnectionHub;
use crate::ws::registry::{Subscribed, SubscriptionRegistry};
use crate::ws::router::notification;
use bus_types::{BusEvent, BusObject, BusValue, EventKind};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Subscription methods handler
pub struct EventRpc {
    registry: Arc<SubscriptionRegistry>,
    hub: Arc<ConnectionHub>,
    metrics: Arc<GatewayMetrics>,
    default_timeout: Duration,
}

impl EventRpc {
    pub fn new(
        registry: Arc<SubscriptionRegistry>,
        hub: Arc<ConnectionHub>,
        metrics: Arc<GatewayMetrics>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            hub,
            metrics,
            default_timeout,
        }
    }

    /// event_subscribe - Start receiving `bus_event` notifications for
    /// `eventName`. Optional `timeout` is in seconds.
    #[instrument(skip_all, fields(connection_id = %connection))]
    pub async fn subscribe(
        &self,
        connection: ConnectionId,
        params: &Map<String, Value>,
    ) -> ApiResult<Value> {
        let event_name = event_name(params)?;
        // Negative or non-integer timeouts fall back to the default.
        let timeout = params
            .get("timeout")
            .and_then(Value::as_u64)
            .map_or(self.default_timeout, Duration::from_secs);

        let outcome = self
            .registry
            .subscribe(event_name, connection, timeout)
            .await
            .map_err(|e| ApiError::operation_failed("Subscription failed", e))?;

        if outcome.is_new() {
            self.metrics.record_subscribed();
            info!(event_name = event_name, "Subscribed");
        }
        if let Subscribed::Joined(Some(value)) = outcome {
            self.send_initial_value(connection, event_name, value);
        }
        Ok(Value::Bool(true))
    }

    /// event_unsubscribe - Stop notifications for `eventName` on this
    /// connection.
    #[instrument(skip_all, fields(connection_id = %connection))]
    pub async fn unsubscribe(
        &self,
        connection: ConnectionId,
        params: &Map<String, Value>,
    ) -> ApiResult<Value> {
        let event_name = event_name(params)?;

        self.registry
            .unsubscribe(event_name, &connection)
            .await
            .map_err(|e| ApiError::operation_failed("Unsubscription failed", e))?;

        self.metrics.record_unsubscribed(1);
        info!(event_name = event_name, "Unsubscribed");
        Ok(Value::Bool(true))
    }

    fn send_initial_value(&self, connection: ConnectionId, event_name: &str, value: BusValue) {
        let data = BusObject::new().with("value", value);
        let event = BusEvent::new(event_name, EventKind::InitialValue, Some(data));

        match self.hub.send(&connection, notification(&event).to_string()) {
            Ok(()) => self.metrics.record_notification_sent(),
            Err(e) => {
                self.metrics.record_notification_dropped();
                warn!(
                    event_name = event_name,
                    connection_id = %connection,
                    error = %e,
                    "Failed to deliver initial value"
                );
            }
        }
    }
}

fn event_name(params: &Map<String, Value>) -> ApiResult<&str> {
    params
        .get("eventName")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::invalid_params("Invalid params: eventName required"))
}
