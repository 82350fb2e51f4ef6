//! Sale coordinator driving the commit pipeline.

use std::time::Instant;

use chrono::{DateTime, Utc};
use common::DocumentId;
use document_store::DocumentStore;
use domain::{RecordedTransaction, RequestValidator, SaleRequest, TransactionNumber, ValidatedSale};

use crate::config::{Collections, CommitConfig};
use crate::error::{Result, SaleError};
use crate::progress::CommitProgress;
use crate::state::CommitState;
use crate::steps::{
    AuditMutationLogger, CustomerAggregateUpdater, InventoryAdjuster, ShiftAggregateUpdater,
    StockAvailabilityChecker, TransactionRecorder,
};

/// The result of a committed sale.
#[derive(Debug, Clone)]
pub struct CommitOutcome {
    /// The transaction record as written, with its store ID.
    pub transaction: RecordedTransaction,
    /// IDs of the stock mutations written, one per line item.
    pub mutation_ids: Vec<DocumentId>,
    /// Always `Committed` for a returned outcome.
    pub state: CommitState,
}

/// Commits sales against a document store.
///
/// The coordinator runs the commit steps strictly in sequence. A failure
/// before the transaction is recorded leaves the store untouched. A failure
/// after it triggers compensation: customer totals are restored, inventory
/// decrements reversed (with `sale_reversal` audit records) and the
/// transaction marked voided. Compensation failures are logged and counted
/// but never replace the error that caused them.
pub struct SaleCoordinator<S: DocumentStore> {
    store: S,
    collections: Collections,
    config: CommitConfig,
}

impl<S: DocumentStore> SaleCoordinator<S> {
    /// Creates a coordinator using the default collections and config.
    pub fn new(store: S) -> Self {
        Self {
            store,
            collections: Collections::default(),
            config: CommitConfig::default(),
        }
    }

    pub fn with_collections(mut self, collections: Collections) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_config(mut self, config: CommitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn config(&self) -> &CommitConfig {
        &self.config
    }

    /// Validates a sale received with `method` and commits it.
    #[tracing::instrument(skip(self, request))]
    pub async fn submit(&self, method: &str, request: SaleRequest) -> Result<CommitOutcome> {
        metrics::counter!("sale_commits_total").increment(1);

        let sale = match RequestValidator::validate(method, request) {
            Ok(sale) => sale,
            Err(e) => {
                let error = SaleError::from(e);
                metrics::counter!("sale_commits_failed", "reason" => error.kind()).increment(1);
                tracing::info!(error = %error, "sale rejected");
                return Err(error);
            }
        };

        self.execute(sale).await
    }

    /// Commits an already validated sale.
    #[tracing::instrument(skip_all, fields(shift_id = %sale.shift_id()))]
    pub async fn commit(&self, sale: ValidatedSale) -> Result<CommitOutcome> {
        metrics::counter!("sale_commits_total").increment(1);
        self.execute(sale).await
    }

    async fn execute(&self, sale: ValidatedSale) -> Result<CommitOutcome> {
        let started = Instant::now();
        let now = Utc::now();
        let mut progress = CommitProgress::new(TransactionNumber::mint(now));

        let result = self.run_steps(&sale, now, &mut progress).await;
        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("sale_commit_duration_seconds").record(duration);

        match result {
            Ok(transaction) => {
                progress.advance(CommitState::Committed);
                metrics::counter!("sale_commits_completed").increment(1);
                tracing::info!(
                    transaction_id = %transaction.id,
                    transaction_number = %progress.transaction_number(),
                    duration,
                    "sale committed"
                );
                Ok(CommitOutcome {
                    transaction,
                    mutation_ids: progress.mutation_ids().to_vec(),
                    state: progress.state(),
                })
            }
            Err(error) => {
                tracing::warn!(
                    step = %progress.state(),
                    transaction_number = %progress.transaction_number(),
                    error = %error,
                    "sale commit failed"
                );
                if progress.state().can_compensate() {
                    self.compensate(&sale, &mut progress, &error).await;
                }
                progress.advance(CommitState::Failed);
                metrics::counter!("sale_commits_failed", "reason" => error.kind()).increment(1);
                Err(error)
            }
        }
    }

    async fn run_steps(
        &self,
        sale: &ValidatedSale,
        now: DateTime<Utc>,
        progress: &mut CommitProgress,
    ) -> Result<RecordedTransaction> {
        let request = sale.request();
        let attempts = self.config.max_attempts();

        // 1. Stock check (reads only)
        progress.advance(CommitState::CheckingStock);
        tracing::info!(step = %progress.state(), "commit step started");
        StockAvailabilityChecker::new(&self.store, &self.collections.inventory_items)
            .check(&request.items)
            .await?;

        // 2. Transaction record
        progress.advance(CommitState::RecordingTransaction);
        tracing::info!(step = %progress.state(), "commit step started");
        let transaction = TransactionRecorder::new(&self.store, &self.collections.transactions)
            .record(sale, progress.transaction_number().clone(), now)
            .await?;
        progress.record_transaction(transaction.clone());

        // 3. Inventory decrements, each followed by its audit record
        progress.advance(CommitState::AdjustingInventory);
        tracing::info!(step = %progress.state(), "commit step started");
        let adjuster =
            InventoryAdjuster::new(&self.store, &self.collections.inventory_items, attempts);
        let audit = AuditMutationLogger::new(&self.store, &self.collections.stock_mutations);
        for item in &request.items {
            let adjustment = adjuster.decrement(item).await?;
            progress.record_adjustment(adjustment.clone());
            let mutation_id = audit.log_sale(request, &adjustment, &transaction).await?;
            progress.record_mutation(mutation_id);
        }

        // 4. Customer totals
        if let Some(customer_id) = request.customer() {
            progress.advance(CommitState::UpdatingCustomer);
            tracing::info!(step = %progress.state(), %customer_id, "commit step started");
            let previous =
                CustomerAggregateUpdater::new(&self.store, &self.collections.customers, attempts)
                    .apply(customer_id, request.total_amount, now)
                    .await?;
            progress.record_customer(customer_id.clone(), previous);
        }

        // 5. Shift totals
        progress.advance(CommitState::UpdatingShift);
        tracing::info!(step = %progress.state(), "commit step started");
        ShiftAggregateUpdater::new(&self.store, &self.collections.shifts, attempts)
            .apply(
                sale.shift_id(),
                request.total_amount,
                request.total_discount_amount,
                &request.payment_method,
            )
            .await?;

        Ok(transaction)
    }

    /// Undoes the writes recorded in `progress`, newest first, then voids
    /// the transaction.
    #[tracing::instrument(
        skip_all,
        fields(transaction_number = %progress.transaction_number(), failed_step = %progress.state())
    )]
    async fn compensate(
        &self,
        sale: &ValidatedSale,
        progress: &mut CommitProgress,
        error: &SaleError,
    ) {
        progress.advance(CommitState::Compensating);
        metrics::counter!("sale_compensations_total").increment(1);

        let Some(transaction) = progress.transaction().cloned() else {
            return;
        };
        let request = sale.request();
        let attempts = self.config.max_attempts();
        let mut failures = 0;

        if let Some(snapshot) = progress.customer() {
            let updater =
                CustomerAggregateUpdater::new(&self.store, &self.collections.customers, attempts);
            if let Err(e) = updater
                .revert(
                    &snapshot.customer_id,
                    request.total_amount,
                    transaction.transaction.created_at,
                    &snapshot.previous,
                )
                .await
            {
                failures += 1;
                compensation_failed("revert_customer", &snapshot.customer_id, &e);
            }
        }

        let adjuster =
            InventoryAdjuster::new(&self.store, &self.collections.inventory_items, attempts);
        let audit = AuditMutationLogger::new(&self.store, &self.collections.stock_mutations);
        for applied in progress.adjustments().iter().rev() {
            match adjuster.restore(&applied.item).await {
                Ok(restored) => {
                    if let Err(e) = audit.log_reversal(request, &restored, &transaction).await {
                        failures += 1;
                        compensation_failed("log_reversal", &applied.item.item_id, &e);
                    }
                }
                Err(e) => {
                    failures += 1;
                    compensation_failed("restore_inventory", &applied.item.item_id, &e);
                }
            }
        }

        if let Err(e) = TransactionRecorder::new(&self.store, &self.collections.transactions)
            .void(&transaction.id, &error.to_string())
            .await
        {
            failures += 1;
            compensation_failed("void_transaction", &transaction.id, &e);
        }

        progress.record_compensation_failures(failures);
        if failures == 0 {
            tracing::info!(transaction_id = %transaction.id, "sale compensated");
        } else {
            tracing::error!(
                transaction_id = %transaction.id,
                failures,
                "sale compensation incomplete"
            );
        }
    }
}

fn compensation_failed(action: &'static str, entity_id: &DocumentId, error: &SaleError) {
    metrics::counter!("sale_compensation_failures_total", "action" => action).increment(1);
    tracing::error!(action, entity_id = %entity_id, error = %error, "compensation step failed");
}
