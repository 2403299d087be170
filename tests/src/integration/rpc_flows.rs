//! # Request/Response Flows
//!
//! Every inbound frame gets exactly one response frame on the same
//! connection, with the request id echoed.

#[cfg(test)]
mod tests {
    use crate::harness::TestGateway;
    use serde_json::{json, Value};

    // =========================================================================
    // DATA POINTS
    // =========================================================================

    #[tokio::test]
    async fn test_bus_get_single_path() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        let response = client
            .call(json!({"method": "bus_get", "params": {"path": "Device.X"}, "id": 1}))
            .await;
        assert_eq!(
            response,
            json!({"jsonrpc": "2.0", "result": {"Device.X": 42}, "id": 1})
        );
    }

    #[tokio::test]
    async fn test_bus_get_multiple_and_prefix() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        let response = client
            .call(json!({
                "jsonrpc": "2.0",
                "method": "bus_get",
                "params": {"path": "Device.X, Device.WiFi.SSID"},
                "id": "multi"
            }))
            .await;
        assert_eq!(
            response["result"],
            json!({"Device.X": 42, "Device.WiFi.SSID": "home"})
        );
        assert_eq!(response["id"], "multi");

        let response = client
            .call(json!({"method": "bus_get", "params": {"path": "Device.WiFi."}, "id": 2}))
            .await;
        assert_eq!(response["result"], json!({"Device.WiFi.SSID": "home"}));
    }

    #[tokio::test]
    async fn test_bus_set_then_get() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        let response = client
            .call(json!({
                "method": "bus_set",
                "params": {"path": "Device.WiFi.SSID", "value": "office"},
                "id": 1
            }))
            .await;
        assert_eq!(response["result"], true);

        let response = client
            .call(json!({"method": "bus_get", "params": {"path": "Device.WiFi.SSID"}, "id": 2}))
            .await;
        assert_eq!(response["result"]["Device.WiFi.SSID"], "office");
    }

    #[tokio::test]
    async fn test_bus_errors_carry_diagnostics() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        let response = client
            .call(json!({"method": "bus_get", "params": {"path": "Device.Nope"}, "id": 1}))
            .await;
        assert_eq!(response["error"]["code"], -32000);
        assert_eq!(
            response["error"]["message"],
            "bus get failed: element does not exist: Device.Nope"
        );
        assert_eq!(response["id"], 1);

        let response = client
            .call(json!({
                "method": "bus_set",
                "params": {"path": "Device.Serial", "value": "SN-9"},
                "id": 2
            }))
            .await;
        assert_eq!(response["error"]["code"], -32000);
        assert_eq!(
            response["error"]["message"],
            "Set failed: access not permitted: Device.Serial"
        );

        let response = client
            .call(json!({"method": "bus_set", "params": {"path": "Device.X"}, "id": 3}))
            .await;
        assert_eq!(response["error"]["code"], -32602);
    }

    // =========================================================================
    // PROTOCOL ERRORS
    // =========================================================================

    #[tokio::test]
    async fn test_parse_and_request_errors() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        client.send_text("{not json").await;
        let response = client.response().await;
        assert_eq!(response["error"]["code"], -32700);
        assert_eq!(response["id"], Value::Null);

        let response = client.call(json!({"method": "bus_get", "id": 5})).await;
        assert_eq!(response["error"]["code"], -32600);
        assert_eq!(response["id"], 5);

        let response = client
            .call(json!({"method": "eth_blockNumber", "params": {}, "id": 6}))
            .await;
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["error"]["message"], "Method not found");

        // The connection survives all of the above.
        let response = client
            .call(json!({"method": "bus_get", "params": {"path": "Device.X"}, "id": 7}))
            .await;
        assert_eq!(response["result"]["Device.X"], 42);
    }

    #[tokio::test]
    async fn test_binary_frames() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        let request = json!({"method": "bus_get", "params": {"path": "Device.X"}, "id": 1});
        client.send_binary(request.to_string().into_bytes()).await;
        let response = client.response().await;
        assert_eq!(response["result"]["Device.X"], 42);

        client.send_binary(vec![0xff, 0xfe, 0x00]).await;
        let response = client.response().await;
        assert_eq!(response["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_legacy_aliases() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        let response = client
            .call(json!({"method": "rbus_set", "params": {"path": "Device.X", "value": 5}, "id": 1}))
            .await;
        assert_eq!(response["result"], true);

        let response = client
            .call(json!({"method": "rbus_get", "params": {"path": "Device.X"}, "id": 2}))
            .await;
        assert_eq!(response["result"]["Device.X"], 5);
    }

    #[tokio::test]
    async fn test_subprotocol_negotiation() {
        let gw = TestGateway::start().await;
        let (mut client, protocol) = gw.connect_with_protocol().await;
        assert_eq!(protocol.as_deref(), Some("jsonrpc"));

        let response = client
            .call(json!({"method": "bus_get", "params": {"path": "Device.X"}, "id": 1}))
            .await;
        assert_eq!(response["result"]["Device.X"], 42);
    }

    #[tokio::test]
    async fn test_request_metrics() {
        let gw = TestGateway::start().await;
        let mut client = gw.connect().await;

        client
            .call(json!({"method": "bus_set", "params": {"path": "Device.X", "value": 1}, "id": 1}))
            .await;
        client
            .call(json!({"method": "nope", "params": {}, "id": 2}))
            .await;

        let snapshot = gw.metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.requests_success, 1);
        assert_eq!(snapshot.requests_error, 1);
        assert_eq!(snapshot.write_requests_total, 1);
    }
}
