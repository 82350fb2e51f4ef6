//! Sale commit pipeline over a per-document store.
//!
//! A sale touches five collections that the store cannot update atomically.
//! The coordinator runs the fixed workflow:
//! 1. Check stock for every line item (reads only)
//! 2. Record the transaction
//! 3. Decrement inventory and append a stock mutation, per line item
//! 4. Update the customer's running totals (when a customer is attached)
//! 5. Update the shift's running totals
//!
//! Every read-modify-write is a conditional update retried on version
//! conflict. If any step after the transaction is recorded fails, the
//! applied writes are compensated in reverse order and the transaction is
//! marked voided.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod progress;
pub mod state;
pub mod steps;

pub use config::{Collections, CommitConfig};
pub use coordinator::{CommitOutcome, SaleCoordinator};
pub use error::{Result, SaleError};
pub use progress::CommitProgress;
pub use state::CommitState;
pub use steps::{
    AppliedAdjustment, AuditMutationLogger, CustomerAggregateUpdater, InventoryAdjuster,
    ShiftAggregateUpdater, StockAvailabilityChecker, TransactionRecorder,
};
