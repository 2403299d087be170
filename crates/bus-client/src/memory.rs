//! # In-Memory Bus
//!
//! Process-local data model plus event delivery.
//!
//! Elements live in an ordered map so prefix reads come back sorted. Events
//! go through an unbounded queue drained by a dedicated delivery task; the
//! handler is looked up when the event is delivered, so an unsubscribe that
//! lands first wins.

use async_trait::async_trait;
use bus_types::{BusEvent, BusObject, BusValue, EventKind, Property};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{BusClient, EventHandler};
use crate::error::BusError;

#[derive(Debug, Clone)]
struct Element {
    value: BusValue,
    writable: bool,
}

type HandlerTable = Arc<RwLock<HashMap<String, EventHandler>>>;

/// In-process bus.
pub struct InMemoryBus {
    component: String,

    elements: RwLock<BTreeMap<String, Element>>,

    /// Event-only names (no backing data element).
    declared_events: RwLock<HashSet<String>>,

    /// One handler per event name.
    handlers: HandlerTable,

    queue: mpsc::UnboundedSender<BusEvent>,

    dispatcher: Mutex<Option<JoinHandle<()>>>,

    closed: AtomicBool,

    events_published: AtomicU64,
}

impl InMemoryBus {
    /// Open a bus handle registered under `component`.
    ///
    /// Must be called from within a tokio runtime; the delivery task is
    /// spawned on it.
    pub fn open(component: &str) -> Result<Self, BusError> {
        if component.trim().is_empty() {
            return Err(BusError::InvalidInput("component name is empty".into()));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| BusError::NotInitialized(e.to_string()))?;

        let handlers: HandlerTable = Arc::new(RwLock::new(HashMap::new()));
        let (queue, rx) = mpsc::unbounded_channel();
        let dispatcher = runtime.spawn(deliver(rx, handlers.clone()));

        info!(component = component, "Bus opened");

        Ok(Self {
            component: component.to_string(),
            elements: RwLock::new(BTreeMap::new()),
            declared_events: RwLock::new(HashSet::new()),
            handlers,
            queue,
            dispatcher: Mutex::new(Some(dispatcher)),
            closed: AtomicBool::new(false),
            events_published: AtomicU64::new(0),
        })
    }

    /// Add or replace a writable data element.
    pub fn insert(&self, path: impl Into<String>, value: impl Into<BusValue>) {
        self.put(path.into(), value.into(), true);
    }

    /// Add or replace a data element that rejects `set`.
    pub fn insert_read_only(&self, path: impl Into<String>, value: impl Into<BusValue>) {
        self.put(path.into(), value.into(), false);
    }

    fn put(&self, path: String, value: BusValue, writable: bool) {
        self.elements
            .write()
            .insert(path, Element { value, writable });
    }

    /// Make an event name subscribable without a backing data element.
    pub fn declare_event(&self, name: impl Into<String>) {
        self.declared_events.write().insert(name.into());
    }

    /// Fire an event.
    ///
    /// Returns the number of handlers the event was queued for (0 or 1).
    pub fn publish(
        &self,
        name: &str,
        kind: EventKind,
        data: Option<BusObject>,
    ) -> Result<usize, BusError> {
        self.ensure_open()?;
        self.events_published.fetch_add(1, Ordering::Relaxed);

        if !self.handlers.read().contains_key(name) {
            debug!(event = name, kind = %kind, "Event dropped (no handler)");
            return Ok(0);
        }

        self.queue
            .send(BusEvent::new(name, kind, data))
            .map_err(|_| BusError::Closed)?;

        debug!(event = name, kind = %kind, "Event queued");
        Ok(1)
    }

    /// Component name this handle was opened with.
    #[must_use]
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Whether a handler is currently registered for `event_name`.
    #[must_use]
    pub fn is_subscribed(&self, event_name: &str) -> bool {
        self.handlers.read().contains_key(event_name)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Total events fired, including those nobody was listening for.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    fn ensure_open(&self) -> Result<(), BusError> {
        if self.closed.load(Ordering::Acquire) {
            Err(BusError::Closed)
        } else {
            Ok(())
        }
    }

    fn is_known_event(&self, name: &str) -> bool {
        self.elements.read().contains_key(name) || self.declared_events.read().contains(name)
    }
}

async fn deliver(mut rx: mpsc::UnboundedReceiver<BusEvent>, handlers: HandlerTable) {
    while let Some(event) = rx.recv().await {
        // Clone out so the handler runs without the table lock held.
        let handler = handlers.read().get(&event.name).cloned();
        match handler {
            Some(handler) => handler(event),
            None => debug!(event = %event.name, "Handler gone before delivery"),
        }
    }
}

#[async_trait]
impl BusClient for InMemoryBus {
    async fn get(&self, paths: &[String]) -> Result<Vec<Property>, BusError> {
        self.ensure_open()?;
        if paths.is_empty() {
            return Err(BusError::InvalidInput("no paths".into()));
        }

        let elements = self.elements.read();
        let mut out = Vec::new();

        for path in paths {
            if path.ends_with('.') {
                let before = out.len();
                out.extend(
                    elements
                        .range::<String, _>(path.clone()..)
                        .take_while(|(name, _)| name.starts_with(path.as_str()))
                        .map(|(name, el)| Property::new(name.clone(), el.value.clone())),
                );
                if out.len() == before {
                    return Err(BusError::ElementDoesNotExist(path.clone()));
                }
            } else {
                let el = elements
                    .get(path)
                    .ok_or_else(|| BusError::ElementDoesNotExist(path.clone()))?;
                out.push(Property::new(path.clone(), el.value.clone()));
            }
        }

        Ok(out)
    }

    async fn set(&self, path: &str, value: BusValue) -> Result<(), BusError> {
        self.ensure_open()?;

        let old = {
            let mut elements = self.elements.write();
            let el = elements
                .get_mut(path)
                .ok_or_else(|| BusError::ElementDoesNotExist(path.to_string()))?;
            if !el.writable {
                return Err(BusError::AccessNotAllowed(path.to_string()));
            }
            std::mem::replace(&mut el.value, value.clone())
        };

        debug!(path = path, "Element updated");

        let data = BusObject::new()
            .with("value", value)
            .with("oldValue", old)
            .with("by", self.component.as_str());
        self.publish(path, EventKind::ValueChanged, Some(data))?;
        Ok(())
    }

    async fn subscribe(
        &self,
        event_name: &str,
        handler: EventHandler,
        timeout: Duration,
    ) -> Result<(), BusError> {
        self.ensure_open()?;
        if !self.is_known_event(event_name) {
            return Err(BusError::ElementDoesNotExist(event_name.to_string()));
        }

        {
            let mut handlers = self.handlers.write();
            if handlers.contains_key(event_name) {
                return Err(BusError::SubscriptionAlreadyExists(event_name.to_string()));
            }
            handlers.insert(event_name.to_string(), handler);
        }

        debug!(
            event = event_name,
            timeout_secs = timeout.as_secs(),
            "Subscribed"
        );

        let initial = self.elements.read().get(event_name).map(|el| el.value.clone());
        if let Some(value) = initial {
            let data = BusObject::new().with("value", value);
            self.publish(event_name, EventKind::InitialValue, Some(data))?;
        }

        Ok(())
    }

    async fn unsubscribe(&self, event_name: &str) -> Result<(), BusError> {
        self.ensure_open()?;
        match self.handlers.write().remove(event_name) {
            Some(_) => {
                debug!(event = event_name, "Unsubscribed");
                Ok(())
            }
            None => Err(BusError::SubscriptionNotFound(event_name.to_string())),
        }
    }

    async fn close(&self) -> Result<(), BusError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(BusError::Closed);
        }

        let remaining = {
            let mut handlers = self.handlers.write();
            let n = handlers.len();
            handlers.clear();
            n
        };
        if remaining > 0 {
            warn!(
                component = %self.component,
                remaining = remaining,
                "Bus closed with live subscriptions"
            );
        }

        if let Some(task) = self.dispatcher.lock().take() {
            task.abort();
        }

        info!(component = %self.component, "Bus closed");
        Ok(())
    }
}

impl Drop for InMemoryBus {
    fn drop(&mut self) {
        if let Some(task) = self.dispatcher.lock().take() {
            task.abort();
        }
    }
}
