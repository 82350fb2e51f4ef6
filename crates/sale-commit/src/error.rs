//! Sale commit error types.

use common::DocumentId;
use document_store::DocumentStoreError;
use domain::{AmountOverflow, ValidationError};
use thiserror::Error;

/// Errors that can end a sale commit.
#[derive(Debug, Error)]
pub enum SaleError {
    /// The sale was not submitted with the sale-submission method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The sale payload is structurally invalid.
    #[error("Invalid transaction data: {0}")]
    InvalidRequest(String),

    /// The sale carries no shift ID.
    #[error("Shift is not active")]
    InactiveShift,

    /// A line item asks for more units than are on hand.
    #[error("Insufficient stock for {item_name} ({available} left)")]
    InsufficientStock {
        item_id: DocumentId,
        item_name: String,
        available: i64,
    },

    /// Concurrent sales kept moving an item's stock until retries ran out.
    #[error("Stock for {item_name} is changing too fast; gave up after {attempts} attempts")]
    StockContention {
        item_id: DocumentId,
        item_name: String,
        attempts: u32,
    },

    /// A read or write against the document store failed.
    #[error("Document store error: {0}")]
    Store(#[from] DocumentStoreError),

    /// Any other failure.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl SaleError {
    /// Returns true for failures caused by the request itself. These are
    /// detected before any store I/O, except a total that would overflow a
    /// stored running total, which surfaces as `InvalidRequest` mid-commit.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SaleError::MethodNotAllowed | SaleError::InvalidRequest(_) | SaleError::InactiveShift
        )
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SaleError::MethodNotAllowed => "method_not_allowed",
            SaleError::InvalidRequest(_) => "invalid_request",
            SaleError::InactiveShift => "inactive_shift",
            SaleError::InsufficientStock { .. } => "insufficient_stock",
            SaleError::StockContention { .. } => "stock_contention",
            SaleError::Store(_) => "store",
            SaleError::Unexpected(_) => "unexpected",
        }
    }

    /// Returns true for failures caused by the current stock level.
    pub fn is_stock_conflict(&self) -> bool {
        matches!(
            self,
            SaleError::InsufficientStock { .. } | SaleError::StockContention { .. }
        )
    }
}

impl From<ValidationError> for SaleError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MethodNotAllowed => SaleError::MethodNotAllowed,
            ValidationError::InvalidRequest(msg) => SaleError::InvalidRequest(msg),
            ValidationError::InactiveShift => SaleError::InactiveShift,
        }
    }
}

impl From<AmountOverflow> for SaleError {
    fn from(err: AmountOverflow) -> Self {
        SaleError::InvalidRequest(err.to_string())
    }
}

impl From<serde_json::Error> for SaleError {
    fn from(err: serde_json::Error) -> Self {
        SaleError::Unexpected(err.to_string())
    }
}

/// Convenience type alias for sale commit results.
pub type Result<T> = std::result::Result<T, SaleError>;
