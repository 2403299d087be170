//! # Error Types
//!
//! Errors raised while building bus values.

use thiserror::Error;

/// Errors from validating constructors on the value model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A calendar or timezone field is outside its valid range.
    #[error("invalid datetime field {field}: {value}")]
    InvalidDateTime { field: &'static str, value: i32 },
}
