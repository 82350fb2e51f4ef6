use common::DocumentId;
use document_store::{DocumentStore, DocumentStoreExt};
use domain::{RecordedTransaction, SaleRequest, StockMutation};

use super::AppliedAdjustment;
use crate::error::Result;

/// Appends stock mutation records. Mutations are never updated.
pub struct AuditMutationLogger<'a, S: DocumentStore> {
    store: &'a S,
    mutations: &'a str,
}

impl<'a, S: DocumentStore> AuditMutationLogger<'a, S> {
    pub fn new(store: &'a S, mutations: &'a str) -> Self {
        Self { store, mutations }
    }

    /// Records units leaving stock for `transaction`.
    #[tracing::instrument(skip_all, fields(item_id = %adjustment.item.item_id))]
    pub async fn log_sale(
        &self,
        request: &SaleRequest,
        adjustment: &AppliedAdjustment,
        transaction: &RecordedTransaction,
    ) -> Result<DocumentId> {
        let mutation = StockMutation::sale(
            request,
            &adjustment.item,
            adjustment.previous_quantity,
            &transaction.id,
            &transaction.transaction.transaction_number,
        );
        self.append(&mutation).await
    }

    /// Records units returned to stock when `transaction` is rolled back.
    #[tracing::instrument(skip_all, fields(item_id = %adjustment.item.item_id))]
    pub async fn log_reversal(
        &self,
        request: &SaleRequest,
        adjustment: &AppliedAdjustment,
        transaction: &RecordedTransaction,
    ) -> Result<DocumentId> {
        let mutation = StockMutation::reversal(
            request,
            &adjustment.item,
            adjustment.previous_quantity,
            &transaction.id,
            &transaction.transaction.transaction_number,
        );
        self.append(&mutation).await
    }

    async fn append(&self, mutation: &StockMutation) -> Result<DocumentId> {
        let document = self
            .store
            .create_from(self.mutations, None, mutation)
            .await?;
        Ok(document.id)
    }
}
