use document_store::{DocumentStore, DocumentStoreExt, UpdateOptions};
use domain::{InventoryItem, LineItem};
use serde::Serialize;

use super::record_conflict_retry;
use crate::error::{Result, SaleError};

/// An inventory quantity change that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAdjustment {
    pub item: LineItem,
    pub previous_quantity: i64,
    pub new_quantity: i64,
}

#[derive(Debug, Serialize)]
struct QuantityUpdate {
    quantity: i64,
}

/// Moves inventory quantities with conditional updates.
///
/// Each change reads the item, computes the new quantity and writes it
/// only if the item is still at the version that was read. A lost race
/// re-reads and tries again, up to `max_attempts` in total.
pub struct InventoryAdjuster<'a, S: DocumentStore> {
    store: &'a S,
    inventory: &'a str,
    max_attempts: u32,
}

impl<'a, S: DocumentStore> InventoryAdjuster<'a, S> {
    pub fn new(store: &'a S, inventory: &'a str, max_attempts: u32) -> Self {
        Self {
            store,
            inventory,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Takes `item.quantity` units out of stock.
    ///
    /// Sufficiency is checked again on every read, so a concurrent sale that
    /// drained the item yields `InsufficientStock` rather than a negative
    /// quantity. Running out of attempts yields `StockContention`.
    #[tracing::instrument(skip(self, item), fields(item_id = %item.item_id, quantity = item.quantity))]
    pub async fn decrement(&self, item: &LineItem) -> Result<AppliedAdjustment> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self
                .store
                .get_as::<InventoryItem>(self.inventory, &item.item_id)
                .await?;

            if !current.record.covers(item.quantity) {
                return Err(SaleError::InsufficientStock {
                    item_id: item.item_id.clone(),
                    item_name: item.name.clone(),
                    available: current.record.quantity,
                });
            }

            let new_quantity = current.record.after_sale(item.quantity);
            match self.write(item, current.version, new_quantity).await {
                Ok(()) => {
                    return Ok(AppliedAdjustment {
                        item: item.clone(),
                        previous_quantity: current.record.quantity,
                        new_quantity,
                    });
                }
                Err(e) if e.is_version_conflict() => {
                    if attempt >= self.max_attempts {
                        tracing::warn!(attempts = attempt, "gave up on contended stock");
                        return Err(SaleError::StockContention {
                            item_id: item.item_id.clone(),
                            item_name: item.name.clone(),
                            attempts: attempt,
                        });
                    }
                    record_conflict_retry(self.inventory, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Puts `item.quantity` units back into stock.
    #[tracing::instrument(skip(self, item), fields(item_id = %item.item_id, quantity = item.quantity))]
    pub async fn restore(&self, item: &LineItem) -> Result<AppliedAdjustment> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self
                .store
                .get_as::<InventoryItem>(self.inventory, &item.item_id)
                .await?;

            let new_quantity = current.record.quantity + i64::from(item.quantity);
            match self.write(item, current.version, new_quantity).await {
                Ok(()) => {
                    return Ok(AppliedAdjustment {
                        item: item.clone(),
                        previous_quantity: current.record.quantity,
                        new_quantity,
                    });
                }
                Err(e) if e.is_version_conflict() && attempt < self.max_attempts => {
                    record_conflict_retry(self.inventory, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn write(
        &self,
        item: &LineItem,
        expected: document_store::Version,
        quantity: i64,
    ) -> document_store::Result<()> {
        self.store
            .update_from(
                self.inventory,
                &item.item_id,
                &QuantityUpdate { quantity },
                UpdateOptions::expect_version(expected),
            )
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::{DocumentStoreError, InMemoryDocumentStore, StoreOperation};
    use serde_json::json;

    async fn quantity(store: &InMemoryDocumentStore, id: &str) -> i64 {
        store
            .get_as::<InventoryItem>("inventoryItems", &id.into())
            .await
            .unwrap()
            .record
            .quantity
    }

    #[tokio::test]
    async fn test_decrement_updates_quantity() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_raw("inventoryItems", "A", json!({ "quantity": 10, "name": "Widget" }))
            .await;
        let adjuster = InventoryAdjuster::new(&store, "inventoryItems", 4);

        let applied = adjuster
            .decrement(&LineItem::new("A", "Widget", 3))
            .await
            .unwrap();

        assert_eq!(applied.previous_quantity, 10);
        assert_eq!(applied.new_quantity, 7);
        assert_eq!(quantity(&store, "A").await, 7);
        let doc = store.get("inventoryItems", &"A".into()).await.unwrap();
        assert_eq!(doc.field("name"), Some(&json!("Widget")));
    }

    #[tokio::test]
    async fn test_decrement_rejects_short_stock_without_writing() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_raw("inventoryItems", "A", json!({ "quantity": 1 }))
            .await;
        let adjuster = InventoryAdjuster::new(&store, "inventoryItems", 4);

        let err = adjuster
            .decrement(&LineItem::new("A", "Widget", 2))
            .await
            .unwrap_err();

        assert!(matches!(err, SaleError::InsufficientStock { available: 1, .. }));
        let doc = store.get("inventoryItems", &"A".into()).await.unwrap();
        assert_eq!(doc.version.as_i64(), 1);
    }

    #[tokio::test]
    async fn test_restore_adds_units_back() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_raw("inventoryItems", "A", json!({ "quantity": 7 }))
            .await;
        let adjuster = InventoryAdjuster::new(&store, "inventoryItems", 4);

        let applied = adjuster
            .restore(&LineItem::new("A", "Widget", 3))
            .await
            .unwrap();

        assert_eq!(applied.previous_quantity, 7);
        assert_eq!(applied.new_quantity, 10);
        assert_eq!(quantity(&store, "A").await, 10);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_retried() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_raw("inventoryItems", "A", json!({ "quantity": 7 }))
            .await;
        store
            .fail_on("inventoryItems", StoreOperation::Update)
            .await;
        let adjuster = InventoryAdjuster::new(&store, "inventoryItems", 4);

        let err = adjuster
            .decrement(&LineItem::new("A", "Widget", 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SaleError::Store(DocumentStoreError::Unavailable(_))
        ));
        assert_eq!(quantity(&store, "A").await, 7);
    }
}
