//! The sale request submitted by the till.

use common::DocumentId;
use serde::{Deserialize, Serialize};

use super::{Money, PaymentMethod};
use crate::error::AmountOverflow;

/// One (inventory item, quantity) pair within a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// The inventory item being sold.
    #[serde(default)]
    pub item_id: DocumentId,

    /// Display name, used in messages and audit records.
    #[serde(default)]
    pub name: String,

    /// Requested quantity.
    pub quantity: u32,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(item_id: impl Into<DocumentId>, name: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            quantity,
        }
    }
}

/// A sale as submitted for commit.
///
/// Missing `items` and `shiftId` deserialize to empty values so that the
/// [`RequestValidator`](super::RequestValidator) reports them, not the JSON parser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    #[serde(default)]
    pub branch_id: String,

    #[serde(default)]
    pub shift_id: Option<DocumentId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<DocumentId>,

    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub user_name: String,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub amount_paid: Money,

    /// Sale total. Older tills send this as `total`.
    #[serde(default, alias = "total")]
    pub total_amount: Money,

    #[serde(default)]
    pub total_discount_amount: Money,
}

impl SaleRequest {
    /// Returns the attached customer, ignoring blank IDs.
    pub fn customer(&self) -> Option<&DocumentId> {
        self.customer_id.as_ref().filter(|id| !id.is_blank())
    }

    /// Returns the change due: amount paid minus total. May be negative.
    pub fn change(&self) -> Result<Money, AmountOverflow> {
        self.amount_paid
            .checked_sub(self.total_amount)
            .ok_or(AmountOverflow::new("change"))
    }

    /// Total number of units across all line items.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_wire_payload() {
        let request: SaleRequest = serde_json::from_value(json!({
            "branchId": "B1",
            "shiftId": "S1",
            "customerId": "C1",
            "userId": "U1",
            "userName": "Siti",
            "paymentMethod": "cash",
            "items": [{"itemId": "A", "name": "Widget", "quantity": 3}],
            "amountPaid": 100,
            "totalAmount": 90,
            "totalDiscountAmount": 5
        }))
        .unwrap();

        assert_eq!(request.shift_id, Some(DocumentId::new("S1")));
        assert_eq!(request.customer(), Some(&DocumentId::new("C1")));
        assert!(request.payment_method.is_cash());
        assert_eq!(request.items, vec![LineItem::new("A", "Widget", 3)]);
        assert_eq!(request.total_discount_amount, Money::new(5));
        assert_eq!(request.change(), Ok(Money::new(10)));
    }

    #[test]
    fn test_total_alias() {
        let request: SaleRequest =
            serde_json::from_value(json!({"total": 42, "amountPaid": 50})).unwrap();
        assert_eq!(request.total_amount, Money::new(42));
    }

    #[test]
    fn test_missing_fields_default() {
        let request: SaleRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.items.is_empty());
        assert!(request.shift_id.is_none());
        assert!(request.customer().is_none());
        assert_eq!(request.total_discount_amount, Money::zero());
    }

    #[test]
    fn test_blank_customer_is_ignored() {
        let request: SaleRequest = serde_json::from_value(json!({"customerId": ""})).unwrap();
        assert!(request.customer().is_none());
    }

    #[test]
    fn test_negative_change_allowed() {
        let request = SaleRequest {
            amount_paid: Money::new(50),
            total_amount: Money::new(90),
            ..Default::default()
        };
        assert_eq!(request.change(), Ok(Money::new(-40)));
    }

    #[test]
    fn test_unit_count() {
        let request = SaleRequest {
            items: vec![LineItem::new("A", "Widget", 3), LineItem::new("B", "Gadget", 2)],
            ..Default::default()
        };
        assert_eq!(request.unit_count(), 5);
    }

    #[test]
    fn test_negative_quantity_rejected_by_parser() {
        let result = serde_json::from_value::<SaleRequest>(json!({
            "items": [{"itemId": "A", "name": "Widget", "quantity": -1}]
        }));
        assert!(result.is_err());
    }
}
