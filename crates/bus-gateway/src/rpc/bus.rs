//! Data point methods: `bus_get` and `bus_set`.

use crate::codec;
use crate::domain::error::{ApiError, ApiResult};
use bus_client::BusClient;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Split a comma separated path list. Blank entries are dropped.
pub fn split_paths(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Bus read/write methods handler
pub struct BusRpc {
    bus: Arc<dyn BusClient>,
}

impl BusRpc {
    pub fn new(bus: Arc<dyn BusClient>) -> Self {
        Self { bus }
    }

    /// bus_get - Read one or more data points.
    ///
    /// Result maps each returned property name to its value.
    #[instrument(skip(self, params))]
    pub async fn get(&self, params: &Map<String, Value>) -> ApiResult<Value> {
        let raw = params
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::invalid_params("Invalid params"))?;

        let paths = split_paths(raw);
        if paths.is_empty() {
            return Err(ApiError::invalid_params("Invalid or empty path"));
        }

        let properties = self
            .bus
            .get(&paths)
            .await
            .map_err(|e| ApiError::operation_failed("bus get failed", e))?;

        let result: Map<String, Value> = properties
            .iter()
            .filter_map(|p| p.entry())
            .map(|(name, value)| (name.to_string(), codec::to_json(value)))
            .collect();

        debug!(requested = paths.len(), returned = result.len(), "bus_get");
        Ok(Value::Object(result))
    }

    /// bus_set - Write one data point. Returns `true`.
    #[instrument(skip(self, params))]
    pub async fn set(&self, params: &Map<String, Value>) -> ApiResult<Value> {
        let (Some(path), Some(raw)) = (
            params.get("path").and_then(Value::as_str),
            params.get("value"),
        ) else {
            return Err(ApiError::invalid_params("Invalid params"));
        };

        let value =
            codec::from_json(raw).map_err(|e| ApiError::operation_failed("Set failed", e))?;

        self.bus
            .set(path, value)
            .await
            .map_err(|e| ApiError::operation_failed("Set failed", e))?;

        debug!(path = path, "bus_set");
        Ok(Value::Bool(true))
    }
}
