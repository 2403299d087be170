//! # Subscription Flows
//!
//! `event_subscribe` registers interest for one connection; bus events are
//! pushed back as `bus_event` notifications to every subscribed connection.

#[cfg(test)]
mod tests {
    use crate::harness::TestGateway;
    use bus_types::{BusObject, EventKind};
    use serde_json::{json, Value};
    use std::time::Duration;

    fn subscribe(event_name: &str, id: u64) -> Value {
        json!({"method": "event_subscribe", "params": {"eventName": event_name}, "id": id})
    }

    fn unsubscribe(event_name: &str, id: u64) -> Value {
        json!({"method": "event_unsubscribe", "params": {"eventName": event_name}, "id": id})
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    #[tokio::test]
    async fn test_initial_value_then_value_changed() {
        let gw = TestGateway::start().await;
        let mut watcher = gw.connect().await;
        let mut writer = gw.connect().await;

        let response = watcher.call(subscribe("Device.X", 1)).await;
        assert_eq!(response, json!({"jsonrpc": "2.0", "result": true, "id": 1}));

        let initial = watcher.notification().await;
        assert_eq!(
            initial,
            json!({
                "jsonrpc": "2.0",
                "method": "bus_event",
                "params": {"eventName": "Device.X", "type": "initial_value", "data": 42}
            })
        );

        let response = writer
            .call(json!({"method": "bus_set", "params": {"path": "Device.X", "value": 7}, "id": 9}))
            .await;
        assert_eq!(response["result"], true);

        let changed = watcher.notification().await;
        assert_eq!(changed["params"]["eventName"], "Device.X");
        assert_eq!(changed["params"]["type"], "value_changed");
        assert_eq!(changed["params"]["data"], 7);

        // The writer never subscribed.
        assert!(!writer.has_notification_within(Duration::from_millis(200)).await);
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_current_value() {
        let gw = TestGateway::start().await;
        let mut first = gw.connect().await;
        let mut second = gw.connect().await;

        first.call(subscribe("Device.X", 1)).await;
        assert_eq!(first.notification().await["params"]["data"], 42);

        let response = second
            .call(json!({"method": "bus_set", "params": {"path": "Device.X", "value": 8}, "id": 2}))
            .await;
        assert_eq!(response["result"], true);
        assert_eq!(first.notification().await["params"]["type"], "value_changed");

        let response = second.call(subscribe("Device.X", 3)).await;
        assert_eq!(response["result"], true);
        let initial = second.notification().await;
        assert_eq!(initial["params"]["eventName"], "Device.X");
        assert_eq!(initial["params"]["type"], "initial_value");
        assert_eq!(initial["params"]["data"], 8);

        // Only the joining connection is told.
        assert!(!first.has_notification_within(Duration::from_millis(200)).await);
        assert_eq!(gw.bus.subscription_count(), 1);
    }

    #[tokio::test]
    async fn test_event_fans_out_to_every_subscriber() {
        let gw = TestGateway::start().await;
        let mut first = gw.connect().await;
        let mut second = gw.connect().await;

        assert_eq!(first.call(subscribe("Device.Boot!", 1)).await["result"], true);
        assert_eq!(second.call(subscribe("Device.Boot!", 1)).await["result"], true);
        gw.wait_for_subscriptions(2).await;
        assert_eq!(gw.bus.subscription_count(), 1);

        let queued = gw
            .bus
            .publish(
                "Device.Boot!",
                EventKind::General,
                Some(BusObject::new().with("value", "ready")),
            )
            .unwrap();
        assert_eq!(queued, 1);

        for client in [&mut first, &mut second] {
            let frame = client.notification().await;
            assert_eq!(frame["method"], "bus_event");
            assert_eq!(frame["params"]["eventName"], "Device.Boot!");
            assert_eq!(frame["params"]["type"], "general");
            assert_eq!(frame["params"]["data"], "ready");
        }
    }

    #[tokio::test]
    async fn test_event_without_value_has_null_data() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;
        client.call(subscribe("Device.Boot!", 1)).await;

        gw.bus
            .publish("Device.Boot!", EventKind::ObjectCreated, None)
            .unwrap();

        let frame = client.notification().await;
        assert_eq!(frame["params"]["type"], "object_created");
        assert_eq!(frame["params"]["data"], Value::Null);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        client.call(subscribe("Device.Boot!", 1)).await;
        let response = client.call(unsubscribe("Device.Boot!", 2)).await;
        assert_eq!(response["result"], true);
        assert!(!gw.bus.is_subscribed("Device.Boot!"));

        gw.bus
            .publish("Device.Boot!", EventKind::General, None)
            .unwrap();
        assert!(!client.has_notification_within(Duration::from_millis(200)).await);
    }

    // =========================================================================
    // REGISTRY RULES
    // =========================================================================

    #[tokio::test]
    async fn test_duplicate_subscription_is_recorded_once() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        assert_eq!(client.call(subscribe("Device.Boot!", 1)).await["result"], true);
        assert_eq!(client.call(subscribe("Device.Boot!", 2)).await["result"], true);
        assert_eq!(gw.registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_limit() {
        let gw = TestGateway::start_with(|config| config.subscriptions.capacity = 2).await;
        let mut client = gw.connect().await;

        assert_eq!(client.call(subscribe("Device.Boot!", 1)).await["result"], true);
        assert_eq!(client.call(subscribe("Device.X", 2)).await["result"], true);

        let response = client.call(subscribe("Device.WiFi.SSID", 3)).await;
        assert_eq!(response["error"]["code"], -32000);
        let message = response["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Subscription failed: "), "{message}");
        assert_eq!(gw.registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_subscription_errors() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        let response = client.call(subscribe("Device.Ghost", 1)).await;
        assert_eq!(response["error"]["code"], -32000);
        assert_eq!(
            response["error"]["message"],
            "Subscription failed: element does not exist: Device.Ghost"
        );

        let response = client.call(unsubscribe("Device.Boot!", 2)).await;
        assert_eq!(
            response["error"]["message"],
            "Unsubscription failed: not subscribed"
        );

        let response = client
            .call(json!({"method": "event_subscribe", "params": {}, "id": 3}))
            .await;
        assert_eq!(response["error"]["code"], -32602);
        assert_eq!(
            response["error"]["message"],
            "Invalid params: eventName required"
        );
    }

    #[tokio::test]
    async fn test_subscriptions_are_per_connection() {
        let gw = TestGateway::start().await;
        let mut owner = gw.connect().await;
        let mut other = gw.connect().await;

        owner.call(subscribe("Device.Boot!", 1)).await;

        // Another connection cannot remove it.
        let response = other.call(unsubscribe("Device.Boot!", 1)).await;
        assert_eq!(response["error"]["code"], -32000);
        assert_eq!(gw.registry.len().await, 1);
    }
}
