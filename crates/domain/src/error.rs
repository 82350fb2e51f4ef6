//! Domain error types.

use thiserror::Error;

/// Errors detected while validating a sale request, before any store I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The request did not use the sale-submission method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request is structurally invalid (empty cart, bad line item).
    #[error("Invalid transaction data: {0}")]
    InvalidRequest(String),

    /// The request carries no shift ID.
    #[error("Shift is not active")]
    InactiveShift,
}

/// A money total left the representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} is out of range")]
pub struct AmountOverflow {
    pub field: &'static str,
}

impl AmountOverflow {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}
