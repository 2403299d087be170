//! Test fixtures: a gateway on an ephemeral port and a WebSocket client.

use bus_client::InMemoryBus;
use bus_gateway::ws::{ConnectionHub, SubscriptionRegistry};
use bus_gateway::{GatewayConfig, GatewayError, GatewayMetrics, GatewayService};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Upper bound for any single wait in a test.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A running gateway backed by a seeded in-memory bus.
///
/// Seed: `Device.X = 42`, `Device.WiFi.SSID = "home"`, read-only
/// `Device.Serial`, and the declared event `Device.Boot!`.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub bus: Arc<InMemoryBus>,
    pub registry: Arc<SubscriptionRegistry>,
    pub hub: Arc<ConnectionHub>,
    pub metrics: Arc<GatewayMetrics>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), GatewayError>>,
}

impl TestGateway {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut GatewayConfig)) -> Self {
        let mut config = GatewayConfig::default();
        config.host = "127.0.0.1".into();
        config.port = 0;
        configure(&mut config);

        let bus = Arc::new(InMemoryBus::open("gateway-tests").unwrap());
        bus.insert("Device.X", 42);
        bus.insert("Device.WiFi.SSID", "home");
        bus.insert_read_only("Device.Serial", "SN-0001");
        bus.declare_event("Device.Boot!");

        let service = GatewayService::new(config, bus.clone()).unwrap();
        let registry = service.registry();
        let hub = service.hub();
        let metrics = service.metrics();
        let listener = service.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(service.run(listener, async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            bus,
            registry,
            hub,
            metrics,
            shutdown: Some(tx),
            task,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn connect(&self) -> WsClient {
        let (stream, _) = connect_async(self.ws_url()).await.unwrap();
        WsClient::new(stream)
    }

    /// Connect offering the `jsonrpc` subprotocol. Returns the protocol the
    /// server selected.
    pub async fn connect_with_protocol(&self) -> (WsClient, Option<String>) {
        let mut request = self.ws_url().into_client_request().unwrap();
        request
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", HeaderValue::from_static("jsonrpc"));

        let (stream, response) = connect_async(request).await.unwrap();
        let protocol = response
            .headers()
            .get("Sec-WebSocket-Protocol")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        (WsClient::new(stream), protocol)
    }

    /// Poll until the registry holds `expected` subscriptions.
    pub async fn wait_for_subscriptions(&self, expected: usize) {
        let deadline = Instant::now() + RECV_TIMEOUT;
        loop {
            let len = self.registry.len().await;
            if len == expected {
                return;
            }
            assert!(
                Instant::now() < deadline,
                "expected {expected} subscriptions, still {len}"
            );
            sleep(Duration::from_millis(10)).await;
        }
    }

    /// Poll until `expected` connections are registered in the hub.
    pub async fn wait_for_connections(&self, expected: usize) {
        let deadline = Instant::now() + RECV_TIMEOUT;
        while self.hub.len() != expected {
            assert!(
                Instant::now() < deadline,
                "expected {expected} connections, still {}",
                self.hub.len()
            );
            sleep(Duration::from_millis(10)).await;
        }
    }

    /// Trigger graceful shutdown and wait for the server to finish.
    pub async fn stop(mut self) -> Result<(), GatewayError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        timeout(RECV_TIMEOUT, self.task)
            .await
            .expect("gateway did not stop in time")
            .expect("gateway task panicked")
    }
}

/// JSON-RPC client over a real WebSocket.
///
/// Notifications that arrive while waiting for a response are buffered and
/// handed out by [`WsClient::notification`].
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    notifications: VecDeque<Value>,
}

impl WsClient {
    fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self {
            stream,
            notifications: VecDeque::new(),
        }
    }

    pub async fn send_text(&mut self, text: &str) {
        self.stream.send(Message::text(text.to_string())).await.unwrap();
    }

    pub async fn send_binary(&mut self, data: Vec<u8>) {
        self.stream.send(Message::binary(data)).await.unwrap();
    }

    /// Send a request and wait for its response.
    pub async fn call(&mut self, request: Value) -> Value {
        self.send_text(&request.to_string()).await;
        self.response().await
    }

    /// Next frame that is not a notification.
    pub async fn response(&mut self) -> Value {
        loop {
            let frame = self
                .next_frame()
                .await
                .expect("connection closed before response");
            if is_notification(&frame) {
                self.notifications.push_back(frame);
                continue;
            }
            return frame;
        }
    }

    /// Next notification, buffered or fresh.
    pub async fn notification(&mut self) -> Value {
        if let Some(frame) = self.notifications.pop_front() {
            return frame;
        }
        let frame = self
            .next_frame()
            .await
            .expect("connection closed before notification");
        assert!(is_notification(&frame), "unexpected frame {frame}");
        frame
    }

    /// Whether a notification arrives within `wait`.
    pub async fn has_notification_within(&mut self, wait: Duration) -> bool {
        if !self.notifications.is_empty() {
            return true;
        }
        match timeout(wait, self.stream.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                let frame: Value = serde_json::from_str(text.as_str()).unwrap();
                let notified = is_notification(&frame);
                if notified {
                    self.notifications.push_back(frame);
                }
                notified
            }
            _ => false,
        }
    }

    /// `None` once the server has closed the connection.
    pub async fn next_frame(&mut self) -> Option<Value> {
        loop {
            let message = timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for a frame")?;
            match message.ok()? {
                Message::Text(text) => return Some(serde_json::from_str(text.as_str()).unwrap()),
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}

fn is_notification(frame: &Value) -> bool {
    frame.get("method").is_some() && frame.get("id").is_none()
}
