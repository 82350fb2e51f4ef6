//! Domain layer for the point-of-sale commit system.
//!
//! This crate provides the typed data model of a sale:
//! - SaleRequest and LineItem as submitted by the till
//! - the records the commit pipeline reads and writes
//!   (InventoryItem, Transaction, StockMutation, Customer, Shift)
//! - the request validator that runs before any store I/O

pub mod error;
pub mod sale;

pub use common::DocumentId;
pub use error::{AmountOverflow, ValidationError};
pub use sale::{
    Customer, InventoryItem, LineItem, Money, MutationType, PaymentMethod, RecordedTransaction,
    RequestValidator, SALE_SUBMISSION_METHOD, SaleRequest, Shift, StockMutation, Transaction,
    TransactionNumber, TransactionStatus, ValidatedSale,
};
