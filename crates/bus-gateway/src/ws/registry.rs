//! Subscription registry.
//!
//! Binds bus event names to the connections that asked for them.
//!
//! The bus accepts one registration per event name, so the registry
//! multiplexes: the first local subscriber of a name registers it on the bus,
//! later subscribers only join the local set, and the bus registration is
//! cancelled when the last one leaves. Fan-out to every local subscriber
//! happens in the notification router via [`SubscriptionRegistry::resolve`].
//!
//! All state sits behind one async mutex. It is held across the bus call
//! so a concurrent subscribe/unsubscribe of the same name cannot see a
//! half-registered entry.
//!
//! A bus registration whose cancellation failed is remembered. The next
//! subscribe to that name retries the cancellation, or reuses the
//! registration if the bus still holds it.

use crate::domain::connection::ConnectionId;
use bus_client::{BusClient, BusError, EventHandler};
use bus_types::BusValue;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Registry failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("subscription capacity exceeded (max {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("{0}")]
    Bus(#[from] BusError),

    #[error("not subscribed")]
    NotSubscribed,
}

/// Outcome of a successful [`SubscriptionRegistry::subscribe`]
#[derive(Debug, Clone, PartialEq)]
pub enum Subscribed {
    /// The connection already held this subscription.
    Already,
    /// First local subscriber: the bus registration was created.
    Registered,
    /// Joined a live bus registration. Carries the element's current value
    /// when the name is a readable data element.
    Joined(Option<BusValue>),
}

impl Subscribed {
    /// Whether a new (event, connection) pair was stored.
    #[must_use]
    pub fn is_new(&self) -> bool {
        !matches!(self, Self::Already)
    }
}

#[derive(Default)]
struct RegistryState {
    by_event: HashMap<String, HashSet<ConnectionId>>,
    by_connection: HashMap<ConnectionId, HashSet<String>>,
    /// Names whose bus unsubscribe failed
    unreleased: HashSet<String>,
    /// (event, connection) pairs
    len: usize,
}

impl RegistryState {
    fn contains(&self, event_name: &str, connection: &ConnectionId) -> bool {
        self.by_event
            .get(event_name)
            .is_some_and(|subs| subs.contains(connection))
    }

    fn insert(&mut self, event_name: &str, connection: ConnectionId) {
        self.by_event
            .entry(event_name.to_string())
            .or_default()
            .insert(connection);
        self.by_connection
            .entry(connection)
            .or_default()
            .insert(event_name.to_string());
        self.len += 1;
    }

    /// Drop one pair. Returns `Some(last)` if it existed, where `last` says
    /// whether the event has no local subscribers left.
    fn remove(&mut self, event_name: &str, connection: &ConnectionId) -> Option<bool> {
        let subs = self.by_event.get_mut(event_name)?;
        if !subs.remove(connection) {
            return None;
        }
        let last = subs.is_empty();
        if last {
            self.by_event.remove(event_name);
        }

        if let Some(events) = self.by_connection.get_mut(connection) {
            events.remove(event_name);
            if events.is_empty() {
                self.by_connection.remove(connection);
            }
        }

        self.len -= 1;
        Some(last)
    }
}

/// Process-wide table of (event, connection) subscriptions
pub struct SubscriptionRegistry {
    bus: Arc<dyn BusClient>,
    /// Callback registered on the bus for every event name
    handler: EventHandler,
    capacity: usize,
    state: Mutex<RegistryState>,
}

impl SubscriptionRegistry {
    pub fn new(bus: Arc<dyn BusClient>, handler: EventHandler, capacity: usize) -> Self {
        Self {
            bus,
            handler,
            capacity,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Subscribe `connection` to `event_name`.
    ///
    /// An existing pair yields [`Subscribed::Already`], which is not an
    /// error. The entry is stored only after the bus registration succeeds.
    pub async fn subscribe(
        &self,
        event_name: &str,
        connection: ConnectionId,
        timeout: Duration,
    ) -> Result<Subscribed, RegistryError> {
        let mut state = self.state.lock().await;

        if state.contains(event_name, &connection) {
            debug!(event_name = event_name, connection_id = %connection, "Already subscribed");
            return Ok(Subscribed::Already);
        }

        if state.len >= self.capacity {
            warn!(
                event_name = event_name,
                connection_id = %connection,
                capacity = self.capacity,
                "Subscription capacity exceeded"
            );
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let outcome = if state.by_event.contains_key(event_name) {
            Subscribed::Joined(self.current_value(event_name).await)
        } else {
            self.register(&mut state, event_name, timeout).await?;
            Subscribed::Registered
        };

        state.insert(event_name, connection);
        debug!(
            event_name = event_name,
            connection_id = %connection,
            total = state.len,
            "Subscription added"
        );
        Ok(outcome)
    }

    /// Remove one subscription. Other connections' subscriptions to the same
    /// event are unaffected.
    pub async fn unsubscribe(
        &self,
        event_name: &str,
        connection: &ConnectionId,
    ) -> Result<(), RegistryError> {
        let mut state = self.state.lock().await;

        let last = state
            .remove(event_name, connection)
            .ok_or(RegistryError::NotSubscribed)?;
        if last && !self.release(event_name).await {
            state.unreleased.insert(event_name.to_string());
        }

        debug!(
            event_name = event_name,
            connection_id = %connection,
            total = state.len,
            "Subscription removed"
        );
        Ok(())
    }

    /// Remove every subscription owned by `connection`. Returns how many were
    /// removed; calling it for an unknown connection is a no-op.
    pub async fn cleanup(&self, connection: &ConnectionId) -> usize {
        let mut state = self.state.lock().await;

        let Some(events) = state.by_connection.get(connection).cloned() else {
            return 0;
        };

        let mut removed = 0;
        for event_name in &events {
            if let Some(last) = state.remove(event_name, connection) {
                removed += 1;
                if last && !self.release(event_name).await {
                    state.unreleased.insert(event_name.clone());
                }
            }
        }

        debug!(
            connection_id = %connection,
            removed = removed,
            total = state.len,
            "Connection subscriptions cleaned up"
        );
        removed
    }

    /// Connections currently subscribed to `event_name`, in a stable order.
    pub async fn resolve(&self, event_name: &str) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        let mut connections: Vec<ConnectionId> = state
            .by_event
            .get(event_name)
            .map(|subs| subs.iter().copied().collect())
            .unwrap_or_default();
        connections.sort();
        connections
    }

    /// Cancel every bus registration and clear the table. Returns the number
    /// of subscriptions dropped.
    pub async fn shutdown(&self) -> usize {
        let mut state = self.state.lock().await;
        let dropped = std::mem::take(&mut *state);

        for event_name in dropped.by_event.keys().chain(&dropped.unreleased) {
            self.release(event_name).await;
        }

        info!(
            subscriptions = dropped.len,
            events = dropped.by_event.len(),
            "Subscription registry shut down"
        );
        dropped.len
    }

    /// Events `connection` is subscribed to, sorted.
    pub async fn subscriptions_of(&self, connection: &ConnectionId) -> Vec<String> {
        let state = self.state.lock().await;
        let mut events: Vec<String> = state
            .by_connection
            .get(connection)
            .map(|events| events.iter().cloned().collect())
            .unwrap_or_default();
        events.sort();
        events
    }

    /// Number of (event, connection) pairs
    pub async fn len(&self) -> usize {
        self.state.lock().await.len
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Names whose bus registration may still be live with no local
    /// subscribers, sorted.
    pub async fn unreleased(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut names: Vec<String> = state.unreleased.iter().cloned().collect();
        names.sort();
        names
    }

    async fn register(
        &self,
        state: &mut RegistryState,
        event_name: &str,
        timeout: Duration,
    ) -> Result<(), RegistryError> {
        let lingering =
            state.unreleased.remove(event_name) && !self.release(event_name).await;

        match self
            .bus
            .subscribe(event_name, self.handler.clone(), timeout)
            .await
        {
            Ok(()) => {
                debug!(event_name = event_name, "Bus registration added");
                Ok(())
            }
            // Still registered from before, with the same handler.
            Err(BusError::SubscriptionAlreadyExists(_)) if lingering => {
                info!(event_name = event_name, "Reusing lingering bus registration");
                Ok(())
            }
            Err(e) => {
                if lingering {
                    state.unreleased.insert(event_name.to_string());
                }
                Err(e.into())
            }
        }
    }

    /// Returns whether the bus confirmed the cancellation.
    async fn release(&self, event_name: &str) -> bool {
        match self.bus.unsubscribe(event_name).await {
            Ok(()) => {
                debug!(event_name = event_name, "Bus registration released");
                true
            }
            Err(e) => {
                warn!(
                    event_name = event_name,
                    error = %e,
                    "Bus unsubscribe failed"
                );
                false
            }
        }
    }

    // Events and partial paths have no single readable value.
    async fn current_value(&self, event_name: &str) -> Option<BusValue> {
        if event_name.ends_with(|c: char| c == '!' || c == '.') {
            return None;
        }
        let properties = self.bus.get(&[event_name.to_string()]).await.ok()?;
        properties
            .into_iter()
            .find_map(|property| match (property.name, property.value) {
                (Some(name), Some(value)) if name == event_name => Some(value),
                _ => None,
            })
    }
}
