use chrono::{DateTime, Utc};
use common::DocumentId;
use document_store::{DocumentStore, DocumentStoreExt, UpdateOptions};
use domain::{RecordedTransaction, Transaction, TransactionNumber, TransactionStatus, ValidatedSale};
use serde::Serialize;

use crate::error::Result;

/// Fields written when a transaction is rolled back.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoidTransaction<'a> {
    status: TransactionStatus,
    void_reason: &'a str,
}

/// Creates the transaction record, and voids it during compensation.
pub struct TransactionRecorder<'a, S: DocumentStore> {
    store: &'a S,
    transactions: &'a str,
}

impl<'a, S: DocumentStore> TransactionRecorder<'a, S> {
    pub fn new(store: &'a S, transactions: &'a str) -> Self {
        Self {
            store,
            transactions,
        }
    }

    /// Writes the transaction record with a store-generated ID.
    #[tracing::instrument(skip_all, fields(transaction_number = %transaction_number))]
    pub async fn record(
        &self,
        sale: &ValidatedSale,
        transaction_number: TransactionNumber,
        now: DateTime<Utc>,
    ) -> Result<RecordedTransaction> {
        let transaction = Transaction::record(sale, transaction_number, now)?;
        let document = self
            .store
            .create_from(self.transactions, None, &transaction)
            .await?;

        tracing::debug!(transaction_id = %document.id, "transaction recorded");
        Ok(RecordedTransaction {
            id: document.id,
            transaction,
        })
    }

    /// Marks a recorded transaction voided. Nothing else about it changes.
    #[tracing::instrument(skip(self))]
    pub async fn void(&self, transaction_id: &DocumentId, reason: &str) -> Result<()> {
        let update = VoidTransaction {
            status: TransactionStatus::Voided,
            void_reason: reason,
        };
        self.store
            .update_from(self.transactions, transaction_id, &update, UpdateOptions::new())
            .await?;
        Ok(())
    }
}
