use chrono::{DateTime, Utc};
use common::DocumentId;
use document_store::{DocumentStore, DocumentStoreExt, UpdateOptions};
use domain::{AmountOverflow, Customer, Money};

use super::record_conflict_retry;
use crate::error::Result;

/// Keeps a customer's lifetime totals in step with their sales.
pub struct CustomerAggregateUpdater<'a, S: DocumentStore> {
    store: &'a S,
    customers: &'a str,
    max_attempts: u32,
}

impl<'a, S: DocumentStore> CustomerAggregateUpdater<'a, S> {
    pub fn new(store: &'a S, customers: &'a str, max_attempts: u32) -> Self {
        Self {
            store,
            customers,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Adds one sale of `amount` made at `at`. Returns the totals as they
    /// were before the sale.
    #[tracing::instrument(skip(self))]
    pub async fn apply(
        &self,
        customer_id: &DocumentId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<Customer> {
        self.modify(customer_id, |current| current.with_sale(amount, at))
            .await
    }

    /// Takes the sale of `amount` made at `sold_at` back out. The last
    /// transaction date reverts to the one in `previous` unless a later sale
    /// has moved it on since.
    #[tracing::instrument(skip(self, previous))]
    pub async fn revert(
        &self,
        customer_id: &DocumentId,
        amount: Money,
        sold_at: DateTime<Utc>,
        previous: &Customer,
    ) -> Result<Customer> {
        let previous_date = previous.last_transaction_date;
        self.modify(customer_id, |current| {
            current.without_sale(amount, sold_at, previous_date)
        })
        .await
    }

    async fn modify<F>(&self, customer_id: &DocumentId, change: F) -> Result<Customer>
    where
        F: Fn(&Customer) -> std::result::Result<Customer, AmountOverflow>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self
                .store
                .get_as::<Customer>(self.customers, customer_id)
                .await?;
            let next = change(&current.record)?;

            match self
                .store
                .update_from(
                    self.customers,
                    customer_id,
                    &next,
                    UpdateOptions::expect_version(current.version),
                )
                .await
            {
                Ok(_) => return Ok(current.record),
                Err(e) if e.is_version_conflict() && attempt < self.max_attempts => {
                    record_conflict_retry(self.customers, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
