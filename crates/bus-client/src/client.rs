//! # Client Trait
//!
//! The collaborator interface the gateway is written against.

use async_trait::async_trait;
use bus_types::{BusEvent, BusValue, Property};
use std::sync::Arc;
use std::time::Duration;

use crate::error::BusError;

/// Subscription callback.
///
/// Whatever context the subscriber needs travels inside the closure. It is
/// invoked from the bus's delivery task and must not block.
pub type EventHandler = Arc<dyn Fn(BusEvent) + Send + Sync>;

/// Operations the gateway needs from the bus.
#[async_trait]
pub trait BusClient: Send + Sync {
    /// Read one or more data points. A path ending in `.` addresses every
    /// element under that prefix.
    async fn get(&self, paths: &[String]) -> Result<Vec<Property>, BusError>;

    /// Write a single data point.
    async fn set(&self, path: &str, value: BusValue) -> Result<(), BusError>;

    /// Register `handler` for `event_name`.
    ///
    /// At most one registration per name is held by a client handle; a second
    /// call for the same name fails with
    /// [`BusError::SubscriptionAlreadyExists`]. The bus may deliver an
    /// initial-value event right after registering.
    async fn subscribe(
        &self,
        event_name: &str,
        handler: EventHandler,
        timeout: Duration,
    ) -> Result<(), BusError>;

    /// Cancel the registration for `event_name`.
    async fn unsubscribe(&self, event_name: &str) -> Result<(), BusError>;

    /// Release the handle. Later calls fail with [`BusError::Closed`].
    async fn close(&self) -> Result<(), BusError>;
}
