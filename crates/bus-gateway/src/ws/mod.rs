//! WebSocket transport and event fan-out.
//!
//! - `handler`: one task pair per connection (reader loop, writer task)
//! - `hub`: outbound queues keyed by connection
//! - `registry`: event name to connection subscriptions
//! - `router`: the event pump that turns bus events into notifications

pub mod handler;
pub mod hub;
pub mod registry;
pub mod router;

pub use handler::{ConnectionContext, WebSocketHandler};
pub use hub::{ConnectionHub, DeliveryError};
pub use registry::{RegistryError, Subscribed, SubscriptionRegistry};
pub use router::{event_channel, notification, EventQueue, NotificationRouter};
