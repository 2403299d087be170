//! # Connection Lifecycle
//!
//! Disconnects release subscriptions exactly once; shutdown closes every
//! connection and cancels every bus registration.

#[cfg(test)]
mod tests {
    use crate::harness::TestGateway;
    use serde_json::{json, Value};

    fn subscribe(event_name: &str) -> Value {
        json!({"method": "event_subscribe", "params": {"eventName": event_name}, "id": 1})
    }

    #[tokio::test]
    async fn test_close_cleans_up_subscriptions() {
        let gw = TestGateway::start().await;
        let mut leaving = gw.connect().await;
        let mut staying = gw.connect().await;

        leaving.call(subscribe("Device.Boot!")).await;
        leaving.call(subscribe("Device.X")).await;
        staying.call(subscribe("Device.Boot!")).await;
        gw.wait_for_subscriptions(3).await;

        leaving.close().await;
        gw.wait_for_subscriptions(1).await;
        gw.wait_for_connections(1).await;

        // Still referenced by the remaining connection.
        assert!(gw.bus.is_subscribed("Device.Boot!"));
        assert!(!gw.bus.is_subscribed("Device.X"));

        staying.close().await;
        gw.wait_for_subscriptions(0).await;
        assert_eq!(gw.bus.subscription_count(), 0);

        let snapshot = gw.metrics.snapshot();
        assert_eq!(snapshot.subscriptions_created, 3);
        assert_eq!(snapshot.subscriptions_removed, 3);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;
        client.call(subscribe("Device.Boot!")).await;
        gw.wait_for_connections(1).await;

        let health: Value = reqwest::get(gw.http_url("/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(health["status"], "healthy");
        assert_eq!(health["connections"], 1);
        assert_eq!(health["subscriptions"], 1);
        assert_eq!(health["capacity"], 100);
        assert_eq!(health["metrics"]["websocket_connections"], 1);
    }

    #[tokio::test]
    async fn test_ws_path_alias() {
        let gw = TestGateway::start().await;
        let (stream, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", gw.addr))
            .await
            .unwrap();
        drop(stream);
    }

    #[tokio::test]
    async fn test_shutdown_closes_connections() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;
        client.call(subscribe("Device.Boot!")).await;
        gw.wait_for_subscriptions(1).await;

        let bus = gw.bus.clone();
        let registry = gw.registry.clone();
        gw.stop().await.unwrap();

        // Drain until the server's close arrives.
        while client.next_frame().await.is_some() {}

        assert!(registry.is_empty().await);
        assert!(!bus.is_subscribed("Device.Boot!"));
    }
}
