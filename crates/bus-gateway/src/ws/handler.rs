//! Per-connection WebSocket handler.
//!
//! Each connection gets one writer task that owns the socket sink and
//! drains a bounded outbound queue. Responses from the reader loop and
//! notifications from the event pump both go through that queue, so frames
//! are never interleaved mid-write.

use crate::domain::connection::ConnectionId;
use crate::middleware::GatewayMetrics;
use crate::rpc::RpcDispatcher;
use crate::ws::hub::ConnectionHub;
use crate::ws::registry::SubscriptionRegistry;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// How long a closing connection may spend flushing queued frames.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared state every connection handler needs
#[derive(Clone)]
pub struct ConnectionContext {
    pub dispatcher: Arc<RpcDispatcher>,
    pub registry: Arc<SubscriptionRegistry>,
    pub hub: Arc<ConnectionHub>,
    pub metrics: Arc<GatewayMetrics>,
    /// Outbound queue depth per connection
    pub outbound_buffer: usize,
    /// Flips to `true` when the server starts shutting down
    pub closing: watch::Receiver<bool>,
}

/// WebSocket connection handler
pub struct WebSocketHandler {
    connection_id: ConnectionId,
    ctx: ConnectionContext,
}

impl WebSocketHandler {
    pub fn new(ctx: ConnectionContext) -> Self {
        Self {
            connection_id: ConnectionId::new(),
            ctx,
        }
    }

    #[must_use]
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Serve `socket` until the peer goes away or the server closes.
    pub async fn handle(self, socket: WebSocket) {
        let id = self.connection_id;
        info!(connection_id = %id, "New WebSocket connection");
        self.ctx.metrics.record_ws_connect();

        let (mut sink, mut stream) = socket.split();
        let (tx, mut rx) = mpsc::channel::<String>(self.ctx.outbound_buffer.max(1));
        self.ctx.hub.register(id, tx.clone());

        let writer = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if let Err(e) = sink.send(Message::Text(frame)).await {
                    debug!(connection_id = %id, error = %e, "WebSocket write failed");
                    return;
                }
            }
            // Queue closed: the reader side is done with this connection.
            let _ = sink.close().await;
        });

        let mut closing = self.ctx.closing.clone();
        if *closing.borrow_and_update() {
            debug!(connection_id = %id, "Server closing, rejecting connection");
        } else {
            loop {
                let message = tokio::select! {
                    message = stream.next() => message,
                    _ = closing.changed() => {
                        info!(connection_id = %id, "Server shutting down, closing connection");
                        break;
                    }
                };

                let Some(result) = message else {
                    break;
                };

                let response = match result {
                    Ok(Message::Text(text)) => self.ctx.dispatcher.dispatch(id, &text).await,
                    Ok(Message::Binary(data)) => match String::from_utf8(data) {
                        Ok(text) => self.ctx.dispatcher.dispatch(id, &text).await,
                        Err(_) => {
                            debug!(connection_id = %id, "Binary frame is not UTF-8");
                            self.ctx.dispatcher.parse_failure()
                        }
                    },
                    // Pings are answered by the protocol layer.
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                    Ok(Message::Close(_)) => {
                        debug!(connection_id = %id, "WebSocket close received");
                        break;
                    }
                    Err(e) => {
                        warn!(connection_id = %id, error = %e, "WebSocket error");
                        break;
                    }
                };

                if tx.send(response).await.is_err() {
                    debug!(connection_id = %id, "Writer gone, dropping connection");
                    break;
                }
            }
        }

        self.close(tx, writer).await;
    }

    async fn close(self, tx: mpsc::Sender<String>, writer: tokio::task::JoinHandle<()>) {
        let id = self.connection_id;

        // Stop notification delivery before tearing down subscriptions.
        self.ctx.hub.remove(&id);
        let removed = self.ctx.registry.cleanup(&id).await;
        self.ctx.metrics.record_unsubscribed(removed as u64);

        drop(tx);
        let abort = writer.abort_handle();
        if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
            warn!(connection_id = %id, "Writer did not drain in time, aborting");
            abort.abort();
        }

        self.ctx.metrics.record_ws_disconnect();
        info!(
            connection_id = %id,
            subscriptions_removed = removed,
            "WebSocket connection closed"
        );
    }
}
