//! Recognized JSON-RPC methods.
//!
//! Each operation has a canonical name and a legacy alias kept for clients
//! written against the older method set.

use std::fmt;

/// Name of the server-to-client notification.
pub const NOTIFICATION_METHOD: &str = "bus_event";

/// A routable method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    BusGet,
    BusSet,
    EventSubscribe,
    EventUnsubscribe,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::BusGet,
        Method::BusSet,
        Method::EventSubscribe,
        Method::EventUnsubscribe,
    ];

    /// Resolve a method name, canonical or legacy.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == name || m.legacy_name() == name)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::BusGet => "bus_get",
            Self::BusSet => "bus_set",
            Self::EventSubscribe => "event_subscribe",
            Self::EventUnsubscribe => "event_unsubscribe",
        }
    }

    #[must_use]
    pub fn legacy_name(&self) -> &'static str {
        match self {
            Self::BusGet => "rbus_get",
            Self::BusSet => "rbus_set",
            Self::EventSubscribe => "rbusEvent_Subscribe",
            Self::EventUnsubscribe => "rbusEvent_Unsubscribe",
        }
    }

    /// Whether the method changes bus or registry state.
    #[must_use]
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::BusGet)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
