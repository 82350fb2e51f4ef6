use std::collections::HashMap;

use common::DocumentId;
use document_store::{DocumentStore, DocumentStoreExt};
use domain::{InventoryItem, LineItem};

use crate::error::{Result, SaleError};

/// Confirms every line item is covered by on-hand stock. Reads only.
pub struct StockAvailabilityChecker<'a, S: DocumentStore> {
    store: &'a S,
    inventory: &'a str,
}

impl<'a, S: DocumentStore> StockAvailabilityChecker<'a, S> {
    pub fn new(store: &'a S, inventory: &'a str) -> Self {
        Self { store, inventory }
    }

    /// Checks the cart against current stock.
    ///
    /// An item listed on several lines must be covered for the sum of
    /// those lines. Fails on the first line that is not covered.
    #[tracing::instrument(skip(self, items), fields(lines = items.len()))]
    pub async fn check(&self, items: &[LineItem]) -> Result<()> {
        let mut demand: HashMap<&DocumentId, u32> = HashMap::new();

        for item in items {
            let requested = demand.entry(&item.item_id).or_default();
            *requested = requested.saturating_add(item.quantity);

            let stock = self
                .store
                .get_as::<InventoryItem>(self.inventory, &item.item_id)
                .await?;

            if !stock.record.covers(*requested) {
                tracing::info!(
                    item_id = %item.item_id,
                    requested = *requested,
                    available = stock.record.quantity,
                    "insufficient stock"
                );
                return Err(SaleError::InsufficientStock {
                    item_id: item.item_id.clone(),
                    item_name: item.name.clone(),
                    available: stock.record.quantity,
                });
            }
        }

        Ok(())
    }
}
