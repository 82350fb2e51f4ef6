//! Collection identifiers and commit tuning.

/// Identifiers of the five collections a sale touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub inventory_items: String,
    pub stock_mutations: String,
    pub customers: String,
    pub shifts: String,
    pub transactions: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            inventory_items: "inventoryItems".to_string(),
            stock_mutations: "stockMutations".to_string(),
            customers: "customers".to_string(),
            shifts: "posShifts".to_string(),
            transactions: "posTransactions".to_string(),
        }
    }
}

/// Tuning for the commit pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitConfig {
    /// How many times a read-modify-write is retried after a version conflict.
    pub max_conflict_retries: u32,
}

impl CommitConfig {
    /// Total attempts for one read-modify-write, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_conflict_retries.saturating_add(1)
    }
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collections() {
        let collections = Collections::default();
        assert_eq!(collections.inventory_items, "inventoryItems");
        assert_eq!(collections.stock_mutations, "stockMutations");
        assert_eq!(collections.customers, "customers");
        assert_eq!(collections.shifts, "posShifts");
        assert_eq!(collections.transactions, "posTransactions");
    }

    #[test]
    fn test_attempts_include_first_try() {
        assert_eq!(CommitConfig::default().max_attempts(), 4);
        assert_eq!(
            CommitConfig {
                max_conflict_retries: 0
            }
            .max_attempts(),
            1
        );
    }
}
