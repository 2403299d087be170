//! JSON-RPC response envelopes.

use crate::domain::error::ApiError;
use serde_json::Value;
use tracing::error;

/// Sent when a response cannot be serialized.
pub const FALLBACK_RESPONSE: &str =
    r#"{"jsonrpc":"2.0","error":{"code":-32000,"message":"Response serialization failed"},"id":null}"#;

/// Create JSON-RPC success response
pub fn result_response(id: Value, result: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "result": result,
        "id": id
    })
}

/// Create JSON-RPC error response
pub fn error_response(id: Value, error: &ApiError) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "error": error,
        "id": id
    })
}

/// Serialize a response frame, degrading to [`FALLBACK_RESPONSE`].
pub fn encode(response: &Value) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        error!(error = %e, "Response serialization failed");
        FALLBACK_RESPONSE.to_string()
    })
}
