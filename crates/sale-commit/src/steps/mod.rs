//! The individual steps of a sale commit.
//!
//! Each step borrows the store and the collection it works on. Steps that
//! read-modify-write a document use conditional updates and retry on
//! version conflicts up to a configured number of attempts.

mod audit;
mod customer;
mod inventory;
mod recorder;
mod shift;
mod stock;

pub use audit::AuditMutationLogger;
pub use customer::CustomerAggregateUpdater;
pub use inventory::{AppliedAdjustment, InventoryAdjuster};
pub use recorder::TransactionRecorder;
pub use shift::ShiftAggregateUpdater;
pub use stock::StockAvailabilityChecker;

/// Counts a conditional update that lost a race and is being retried.
pub(crate) fn record_conflict_retry(collection: &str, attempt: u32) {
    metrics::counter!("stock_conflict_retries_total", "collection" => collection.to_string())
        .increment(1);
    tracing::debug!(collection, attempt, "version conflict, retrying");
}
