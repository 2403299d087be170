//! # Bus Events
//!
//! What a subscription callback receives when an event fires.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::{BusObject, BusValue};

/// Classification of a delivered event.
///
/// Numeric codes follow the bus wire protocol. Codes this build does not know
/// are kept as [`EventKind::Unknown`] instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    ObjectCreated,
    ObjectDeleted,
    ValueChanged,
    General,
    InitialValue,
    Interval,
    DurationComplete,
    Unknown(i32),
}

impl EventKind {
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::ObjectCreated,
            1 => Self::ObjectDeleted,
            2 => Self::ValueChanged,
            3 => Self::General,
            4 => Self::InitialValue,
            5 => Self::Interval,
            6 => Self::DurationComplete,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn code(&self) -> i32 {
        match *self {
            Self::ObjectCreated => 0,
            Self::ObjectDeleted => 1,
            Self::ValueChanged => 2,
            Self::General => 3,
            Self::InitialValue => 4,
            Self::Interval => 5,
            Self::DurationComplete => 6,
            Self::Unknown(code) => code,
        }
    }

    /// Wire label used in notifications.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValueChanged => "value_changed",
            Self::ObjectCreated => "object_created",
            Self::ObjectDeleted => "object_deleted",
            Self::General => "general",
            Self::InitialValue => "initial_value",
            Self::Interval => "interval",
            Self::DurationComplete => "duration_complete",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fired event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    /// Name the subscription was registered under.
    pub name: String,
    pub kind: EventKind,
    /// Payload object; the primary value lives under the `value` property.
    pub data: Option<BusObject>,
}

impl BusEvent {
    pub fn new(name: impl Into<String>, kind: EventKind, data: Option<BusObject>) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
        }
    }

    /// The `value` property of the payload, if any.
    #[must_use]
    pub fn value(&self) -> Option<&BusValue> {
        self.data.as_ref().and_then(|data| data.get("value"))
    }
}
