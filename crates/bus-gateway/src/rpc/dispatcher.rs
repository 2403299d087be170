//! Request dispatcher.
//!
//! One inbound text frame in, exactly one response frame out:
//!
//! ```text
//! parse ──► validate ──► route ──► execute ──► respond
//!   │          │           │          │
//! -32700     -32600      -32601    -32602 / -32000
//! ```
//!
//! The request id is echoed verbatim, or `null` when the request had none
//! or could not be parsed.

use crate::domain::connection::ConnectionId;
use crate::domain::error::ApiError;
use crate::domain::methods::Method;
use crate::middleware::GatewayMetrics;
use crate::rpc::response::{encode, error_response, result_response};
use crate::rpc::RpcHandlers;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Routes JSON-RPC requests to method handlers
pub struct RpcDispatcher {
    handlers: RpcHandlers,
    metrics: Arc<GatewayMetrics>,
}

impl RpcDispatcher {
    pub fn new(handlers: RpcHandlers, metrics: Arc<GatewayMetrics>) -> Self {
        Self { handlers, metrics }
    }

    /// Handle one text frame from `connection`, returning the response frame.
    pub async fn dispatch(&self, connection: ConnectionId, text: &str) -> String {
        match serde_json::from_str::<Value>(text) {
            Ok(request) => encode(&self.handle(connection, &request).await),
            Err(e) => {
                debug!(connection_id = %connection, error = %e, "Unparseable request");
                self.parse_failure()
            }
        }
    }

    /// Response frame for input that is not JSON at all.
    pub fn parse_failure(&self) -> String {
        self.metrics.record_request(false, false);
        encode(&error_response(Value::Null, &ApiError::parse_error()))
    }

    /// Handle an already parsed request.
    pub async fn handle(&self, connection: ConnectionId, request: &Value) -> Value {
        let id = request.get("id").cloned().unwrap_or(Value::Null);

        let (name, params) = match validate(request) {
            Ok(parts) => parts,
            Err(e) => {
                self.metrics.record_request(false, false);
                return error_response(id, &e);
            }
        };

        let Some(method) = Method::from_name(name) else {
            debug!(connection_id = %connection, method = name, "Unknown method");
            self.metrics.record_request(false, false);
            return error_response(id, &ApiError::method_not_found());
        };

        let result = match method {
            Method::BusGet => self.handlers.bus.get(params).await,
            Method::BusSet => self.handlers.bus.set(params).await,
            Method::EventSubscribe => self.handlers.event.subscribe(connection, params).await,
            Method::EventUnsubscribe => {
                self.handlers.event.unsubscribe(connection, params).await
            }
        };

        self.metrics.record_request(result.is_ok(), method.is_write());

        match result {
            Ok(value) => result_response(id, value),
            Err(e) => {
                debug!(
                    connection_id = %connection,
                    method = %method,
                    code = e.code,
                    message = %e.message,
                    "Request failed"
                );
                error_response(id, &e)
            }
        }
    }
}

/// A request needs a `method` string and a `params` object.
fn validate(request: &Value) -> Result<(&str, &Map<String, Value>), ApiError> {
    let obj = request.as_object().ok_or_else(ApiError::invalid_request)?;
    let method = obj
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(ApiError::invalid_request)?;
    let params = obj
        .get("params")
        .and_then(Value::as_object)
        .ok_or_else(ApiError::invalid_request)?;
    Ok((method, params))
}
