//! Gateway service - wires the bus, the subscription registry and the
//! WebSocket listener together.
//!
//! Lifecycle: [`GatewayService::new`] builds every component, [`bind`]
//! opens the listener and [`run`] serves until the shutdown future
//! resolves. On shutdown, open connections are told to close, every bus
//! subscription is cancelled and the event pump is stopped.
//!
//! [`bind`]: GatewayService::bind
//! [`run`]: GatewayService::run

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{GatewayMetrics, TracingLayer};
use crate::rpc::{RpcDispatcher, RpcHandlers};
use crate::ws::{
    event_channel, ConnectionContext, ConnectionHub, EventQueue, NotificationRouter,
    SubscriptionRegistry, WebSocketHandler,
};
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bus_client::BusClient;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

/// Subprotocol offered during the WebSocket handshake.
pub const SUBPROTOCOL: &str = "jsonrpc";

/// Gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    bus: Arc<dyn BusClient>,
    registry: Arc<SubscriptionRegistry>,
    hub: Arc<ConnectionHub>,
    metrics: Arc<GatewayMetrics>,
    dispatcher: Arc<RpcDispatcher>,
    events: EventQueue,
    closing: watch::Sender<bool>,
    started_at: DateTime<Utc>,
}

impl GatewayService {
    /// Create a new gateway service over an open bus handle
    pub fn new(config: GatewayConfig, bus: Arc<dyn BusClient>) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        if config.ssl_enabled {
            warn!("ssl_enabled is set but TLS is not terminated here; serving plain ws://");
        }

        let (handler, events) = event_channel();
        let registry = Arc::new(SubscriptionRegistry::new(
            Arc::clone(&bus),
            handler,
            config.subscriptions.capacity,
        ));
        let hub = Arc::new(ConnectionHub::new());
        let metrics = Arc::new(GatewayMetrics::new());

        let handlers = RpcHandlers::new(
            Arc::clone(&bus),
            Arc::clone(&registry),
            Arc::clone(&hub),
            Arc::clone(&metrics),
            Duration::from_secs(config.subscriptions.default_timeout_secs),
        );
        let dispatcher = Arc::new(RpcDispatcher::new(handlers, Arc::clone(&metrics)));
        let (closing, _) = watch::channel(false);

        Ok(Self {
            config,
            bus,
            registry,
            hub,
            metrics,
            dispatcher,
            events,
            closing,
            started_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn registry(&self) -> Arc<SubscriptionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn hub(&self) -> Arc<ConnectionHub> {
        Arc::clone(&self.hub)
    }

    /// Bind the configured `host:port`.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.bind_addr();
        TcpListener::bind(&addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))
    }

    /// Build the HTTP router: WebSocket upgrades on `/` and `/ws`, plus
    /// `/health`.
    pub fn router(&self) -> Router {
        let state = AppState {
            ctx: ConnectionContext {
                dispatcher: Arc::clone(&self.dispatcher),
                registry: Arc::clone(&self.registry),
                hub: Arc::clone(&self.hub),
                metrics: Arc::clone(&self.metrics),
                outbound_buffer: self.config.websocket.outbound_buffer,
                closing: self.closing.subscribe(),
            },
            max_message_size: self.config.websocket.max_message_size,
            started_at: self.started_at,
        };

        Router::new()
            .route("/", get(ws_upgrade))
            .route("/ws", get(ws_upgrade))
            .route("/health", get(health_check))
            .layer(TracingLayer::new())
            .with_state(state)
    }

    /// Serve `listener` until `shutdown` resolves, then tear down.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let Self {
            config,
            bus,
            registry,
            hub,
            metrics,
            events,
            closing,
            ..
        } = self;

        let pump = NotificationRouter::new(Arc::clone(&registry), hub, metrics).spawn(events);

        let port = listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(config.port);
        info!(
            "JSON-RPC WebSocket server running on ws://{}:{}",
            config.host, port
        );

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutting down");
                closing.send_replace(true);
            })
            .await
            .map_err(|e| GatewayError::Serve(e.to_string()));

        let dropped = registry.shutdown().await;
        pump.abort();
        if let Err(e) = bus.close().await {
            warn!(error = %e, "Bus close failed");
        }

        info!(subscriptions_dropped = dropped, "Server shutdown complete");
        served
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    ctx: ConnectionContext,
    max_message_size: usize,
    started_at: DateTime<Utc>,
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.protocols([SUBPROTOCOL])
        .max_message_size(state.max_message_size)
        .on_upgrade(move |socket| WebSocketHandler::new(state.ctx).handle(socket))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let registry = &state.ctx.registry;
    Json(serde_json::json!({
        "status": "healthy",
        "service": "bus-jsonrpc",
        "version": env!("CARGO_PKG_VERSION"),
        "connections": state.ctx.hub.len(),
        "subscriptions": registry.len().await,
        "capacity": registry.capacity(),
        "started_at": state.started_at.to_rfc3339(),
        "metrics": state.ctx.metrics.snapshot(),
    }))
}
