//! # Bus Types Crate
//!
//! The richly-typed value model carried by the data bus.
//!
//! ## Model
//!
//! - [`BusValue`]: tagged union over every primitive the bus understands,
//!   plus the composite [`BusObject`].
//! - [`Property`]: a named slot inside an object. Either half may be absent
//!   when the bus hands us a partially populated property.
//! - [`BusDateTime`]: broken-down calendar time with a timezone offset.
//! - [`BusEvent`] / [`EventKind`]: what the bus delivers to a subscription
//!   callback.
//!
//! Every [`BusValue`] carries exactly one type tag; width and signedness are
//! part of the tag, which is why conversions to width-less formats are lossy.

pub mod datetime;
pub mod errors;
pub mod event;
pub mod value;

pub use datetime::{BusDateTime, TimeZoneOffset};
pub use errors::ValueError;
pub use event::{BusEvent, EventKind};
pub use value::{BusObject, BusValue, Property, ValueType};
