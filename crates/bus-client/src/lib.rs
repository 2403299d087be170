//! # Bus Client
//!
//! The gateway's view of the data bus.
//!
//! ## Contract
//!
//! ```text
//!   get(paths[])            → properties[] | error
//!   set(path, value)        → ()           | error
//!   subscribe(name, cb, t)  → ()           | error   cb fires later, elsewhere
//!   unsubscribe(name)       → ()           | error
//! ```
//!
//! A client handle holds at most one registration per event name. Callbacks
//! run on the bus's own delivery task, never inline in the caller, so
//! consumers must not assume they share an execution context with whoever
//! called `subscribe`.
//!
//! [`InMemoryBus`] implements the contract in-process. It backs the gateway
//! binary and the test suites.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod client;
pub mod error;
pub mod memory;

pub use client::{BusClient, EventHandler};
pub use error::BusError;
pub use memory::InMemoryBus;

/// Default subscription timeout applied when callers have no preference.
pub const DEFAULT_SUBSCRIBE_TIMEOUT_SECS: u64 = 30;
