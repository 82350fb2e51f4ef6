use common::DocumentId;
use document_store::{DocumentStore, DocumentStoreExt, UpdateOptions};
use domain::{Money, PaymentMethod, Shift};

use super::record_conflict_retry;
use crate::error::Result;

/// Keeps a shift's running totals in step with its sales.
pub struct ShiftAggregateUpdater<'a, S: DocumentStore> {
    store: &'a S,
    shifts: &'a str,
    max_attempts: u32,
}

impl<'a, S: DocumentStore> ShiftAggregateUpdater<'a, S> {
    pub fn new(store: &'a S, shifts: &'a str, max_attempts: u32) -> Self {
        Self {
            store,
            shifts,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Adds one sale to the shift totals. Cash sales count toward cash
    /// payments, everything else toward other payments.
    #[tracing::instrument(skip(self))]
    pub async fn apply(
        &self,
        shift_id: &DocumentId,
        total: Money,
        discount: Money,
        method: &PaymentMethod,
    ) -> Result<Shift> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.store.get_as::<Shift>(self.shifts, shift_id).await?;
            let next = current.record.with_sale(total, discount, method)?;

            match self
                .store
                .update_from(
                    self.shifts,
                    shift_id,
                    &next,
                    UpdateOptions::expect_version(current.version),
                )
                .await
            {
                Ok(_) => return Ok(next),
                Err(e) if e.is_version_conflict() && attempt < self.max_attempts => {
                    record_conflict_retry(self.shifts, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
