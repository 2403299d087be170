//! # Bus Errors
//!
//! Display texts are the bus's own diagnostics; the gateway embeds them
//! verbatim in operational error responses.

use thiserror::Error;

/// Errors returned by [`crate::BusClient`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("generic error")]
    General,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("bus not initialized: {0}")]
    NotInitialized(String),

    #[error("element does not exist: {0}")]
    ElementDoesNotExist(String),

    #[error("access not permitted: {0}")]
    AccessNotAllowed(String),

    #[error("subscription already exists: {0}")]
    SubscriptionAlreadyExists(String),

    #[error("subscription does not exist: {0}")]
    SubscriptionNotFound(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("bus connection closed")]
    Closed,
}
