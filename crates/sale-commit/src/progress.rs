//! Journal of what a commit has written so far.

use common::DocumentId;
use domain::{Customer, RecordedTransaction, TransactionNumber};

use crate::state::CommitState;
use crate::steps::AppliedAdjustment;

/// A customer update that may need reverting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSnapshot {
    pub customer_id: DocumentId,
    /// The customer's totals before this sale was applied.
    pub previous: Customer,
}

/// Tracks the state of one commit and the writes it has applied.
///
/// Compensation walks this journal instead of re-deriving what happened,
/// so an entry is added only once its write has succeeded.
#[derive(Debug, Clone)]
pub struct CommitProgress {
    transaction_number: TransactionNumber,
    state: CommitState,
    transaction: Option<RecordedTransaction>,
    adjustments: Vec<AppliedAdjustment>,
    mutation_ids: Vec<DocumentId>,
    customer: Option<CustomerSnapshot>,
    compensation_failures: u32,
}

impl CommitProgress {
    /// Starts a journal for the commit of `transaction_number`.
    pub fn new(transaction_number: TransactionNumber) -> Self {
        Self {
            transaction_number,
            state: CommitState::default(),
            transaction: None,
            adjustments: Vec::new(),
            mutation_ids: Vec::new(),
            customer: None,
            compensation_failures: 0,
        }
    }

    /// Moves to the next state.
    pub fn advance(&mut self, state: CommitState) {
        tracing::debug!(from = %self.state, to = %state, "commit state changed");
        self.state = state;
    }

    pub fn record_transaction(&mut self, transaction: RecordedTransaction) {
        self.transaction = Some(transaction);
    }

    pub fn record_adjustment(&mut self, adjustment: AppliedAdjustment) {
        self.adjustments.push(adjustment);
    }

    pub fn record_mutation(&mut self, mutation_id: DocumentId) {
        self.mutation_ids.push(mutation_id);
    }

    pub fn record_customer(&mut self, customer_id: DocumentId, previous: Customer) {
        self.customer = Some(CustomerSnapshot {
            customer_id,
            previous,
        });
    }

    pub fn record_compensation_failures(&mut self, count: u32) {
        self.compensation_failures += count;
    }
}

// Query methods
impl CommitProgress {
    pub fn transaction_number(&self) -> &TransactionNumber {
        &self.transaction_number
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    /// Returns the recorded transaction, once it has been written.
    pub fn transaction(&self) -> Option<&RecordedTransaction> {
        self.transaction.as_ref()
    }

    /// Returns the inventory decrements applied, in the order they were applied.
    pub fn adjustments(&self) -> &[AppliedAdjustment] {
        &self.adjustments
    }

    /// Returns the IDs of the sale stock mutations written.
    pub fn mutation_ids(&self) -> &[DocumentId] {
        &self.mutation_ids
    }

    pub fn customer(&self) -> Option<&CustomerSnapshot> {
        self.customer.as_ref()
    }

    pub fn compensation_failures(&self) -> u32 {
        self.compensation_failures
    }

    /// Returns true if any write reached the store.
    pub fn has_writes(&self) -> bool {
        self.transaction.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::LineItem;

    #[test]
    fn test_new_progress_has_no_writes() {
        let progress = CommitProgress::new(TransactionNumber::mint(Utc::now()));
        assert_eq!(progress.state(), CommitState::Validating);
        assert!(!progress.has_writes());
        assert!(progress.adjustments().is_empty());
        assert!(progress.customer().is_none());
    }

    #[test]
    fn test_records_applied_writes_in_order() {
        let mut progress = CommitProgress::new(TransactionNumber::mint(Utc::now()));
        progress.advance(CommitState::AdjustingInventory);
        progress.record_adjustment(AppliedAdjustment {
            item: LineItem::new("A", "Widget", 2),
            previous_quantity: 10,
            new_quantity: 8,
        });
        progress.record_adjustment(AppliedAdjustment {
            item: LineItem::new("B", "Gadget", 1),
            previous_quantity: 5,
            new_quantity: 4,
        });
        progress.record_mutation(DocumentId::new("M1"));
        progress.record_customer(DocumentId::new("C1"), Customer::default());
        progress.record_compensation_failures(2);

        assert_eq!(progress.state(), CommitState::AdjustingInventory);
        let ids: Vec<&str> = progress
            .adjustments()
            .iter()
            .map(|a| a.item.item_id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(progress.mutation_ids(), &[DocumentId::new("M1")]);
        assert_eq!(
            progress.customer().map(|c| c.customer_id.as_str()),
            Some("C1")
        );
        assert_eq!(progress.compensation_failures(), 2);
    }
}
