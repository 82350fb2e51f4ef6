//! Commit state machine.

use serde::{Deserialize, Serialize};

/// The stage a sale commit has reached.
///
/// State transitions:
/// ```text
/// Validating ──► CheckingStock ──► RecordingTransaction ──► AdjustingInventory
///     │               │                    │                        │
///     └───────────────┴────────────────────┴──► Failed              ▼
///                                                          UpdatingCustomer (optional)
///                                                                   │
///                                                                   ▼
///                                                            UpdatingShift ──► Committed
///
/// AdjustingInventory | UpdatingCustomer | UpdatingShift ──► Compensating ──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommitState {
    /// The request is being validated; nothing has been read yet.
    #[default]
    Validating,

    /// Inventory is being read to confirm every line item is covered.
    CheckingStock,

    /// The transaction record is being created.
    RecordingTransaction,

    /// Inventory decrements and stock mutations are being written.
    AdjustingInventory,

    /// The customer's running totals are being updated.
    UpdatingCustomer,

    /// The shift's running totals are being updated.
    UpdatingShift,

    /// Every write was applied (terminal state).
    Committed,

    /// A step failed after the transaction was recorded and applied writes
    /// are being reversed.
    Compensating,

    /// The commit did not go through (terminal state).
    Failed,
}

impl CommitState {
    /// Returns true if a failure in this state leaves writes to reverse.
    pub fn can_compensate(&self) -> bool {
        matches!(
            self,
            CommitState::AdjustingInventory
                | CommitState::UpdatingCustomer
                | CommitState::UpdatingShift
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CommitState::Committed | CommitState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Validating => "Validating",
            CommitState::CheckingStock => "CheckingStock",
            CommitState::RecordingTransaction => "RecordingTransaction",
            CommitState::AdjustingInventory => "AdjustingInventory",
            CommitState::UpdatingCustomer => "UpdatingCustomer",
            CommitState::UpdatingShift => "UpdatingShift",
            CommitState::Committed => "Committed",
            CommitState::Compensating => "Compensating",
            CommitState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_validating() {
        assert_eq!(CommitState::default(), CommitState::Validating);
    }

    #[test]
    fn test_can_compensate() {
        assert!(!CommitState::Validating.can_compensate());
        assert!(!CommitState::CheckingStock.can_compensate());
        assert!(!CommitState::RecordingTransaction.can_compensate());
        assert!(CommitState::AdjustingInventory.can_compensate());
        assert!(CommitState::UpdatingCustomer.can_compensate());
        assert!(CommitState::UpdatingShift.can_compensate());
        assert!(!CommitState::Committed.can_compensate());
        assert!(!CommitState::Compensating.can_compensate());
        assert!(!CommitState::Failed.can_compensate());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!CommitState::Validating.is_terminal());
        assert!(!CommitState::UpdatingShift.is_terminal());
        assert!(!CommitState::Compensating.is_terminal());
        assert!(CommitState::Committed.is_terminal());
        assert!(CommitState::Failed.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CommitState::CheckingStock.to_string(), "CheckingStock");
        assert_eq!(
            CommitState::RecordingTransaction.to_string(),
            "RecordingTransaction"
        );
        assert_eq!(CommitState::Committed.to_string(), "Committed");
    }

    #[test]
    fn test_serialization() {
        let state = CommitState::AdjustingInventory;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: CommitState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
