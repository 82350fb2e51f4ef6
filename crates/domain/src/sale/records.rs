//! Records the commit pipeline reads from and writes to the store.
//!
//! Field names follow the camelCase layout of the store collections.
//! Running totals default to zero when a document lacks them.

use chrono::{DateTime, Utc};
use common::DocumentId;
use serde::{Deserialize, Serialize};

use super::{LineItem, Money, PaymentMethod, SaleRequest, TransactionNumber, ValidatedSale};
use crate::error::AmountOverflow;

/// Stock level of an inventory item. Owned by the store; this crate only
/// reads it and writes new quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub quantity: i64,
}

impl InventoryItem {
    /// Returns true if the on-hand quantity covers `requested`.
    pub fn covers(&self, requested: u32) -> bool {
        self.quantity >= i64::from(requested)
    }

    /// Returns the quantity left after removing `requested` units.
    pub fn after_sale(&self, requested: u32) -> i64 {
        self.quantity - i64::from(requested)
    }
}

/// Lifecycle of a recorded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Completed,
    /// A later commit step failed and the sale was rolled back.
    Voided,
}

/// The immutable record of one sale.
///
/// The only change ever made after creation is marking it voided when
/// the rest of the commit could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_number: TransactionNumber,
    pub branch_id: String,
    pub shift_id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<DocumentId>,
    pub user_id: String,
    pub user_name: String,
    pub payment_method: PaymentMethod,
    /// Line items serialized as a JSON array string.
    pub items: String,
    pub amount_paid: Money,
    pub total_amount: Money,
    pub total_discount_amount: Money,
    pub change: Money,
    #[serde(default)]
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_reason: Option<String>,
}

impl Transaction {
    /// Builds the transaction record for a sale committed at `now`.
    pub fn record(
        sale: &ValidatedSale,
        transaction_number: TransactionNumber,
        now: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        let request = sale.request();
        Ok(Self {
            transaction_number,
            branch_id: request.branch_id.clone(),
            shift_id: sale.shift_id().clone(),
            customer_id: request.customer().cloned(),
            user_id: request.user_id.clone(),
            user_name: request.user_name.clone(),
            payment_method: request.payment_method.clone(),
            items: serde_json::to_string(&request.items)?,
            amount_paid: request.amount_paid,
            total_amount: request.total_amount,
            total_discount_amount: request.total_discount_amount,
            change: sale.change(),
            status: TransactionStatus::Completed,
            created_at: now,
            void_reason: None,
        })
    }

    /// Decodes the serialized line items.
    pub fn line_items(&self) -> Result<Vec<LineItem>, serde_json::Error> {
        serde_json::from_str(&self.items)
    }
}

/// A transaction together with the document ID the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedTransaction {
    pub id: DocumentId,
    #[serde(flatten)]
    pub transaction: Transaction,
}

/// Cause of a stock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    Sale,
    SaleReversal,
}

/// Append-only audit record of one inventory quantity change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMutation {
    pub item_id: DocumentId,
    pub item_name: String,
    pub branch_id: String,
    /// Signed quantity delta; negative for a sale.
    pub change: i64,
    pub previous_quantity: i64,
    pub new_quantity: i64,
    #[serde(rename = "type")]
    pub mutation_type: MutationType,
    pub description: String,
    pub related_transaction_id: DocumentId,
    pub user_id: String,
    pub user_name: String,
}

impl StockMutation {
    /// Audit record for units leaving stock through a sale.
    pub fn sale(
        request: &SaleRequest,
        item: &LineItem,
        previous_quantity: i64,
        transaction_id: &DocumentId,
        transaction_number: &TransactionNumber,
    ) -> Self {
        let change = -i64::from(item.quantity);
        Self {
            item_id: item.item_id.clone(),
            item_name: item.name.clone(),
            branch_id: request.branch_id.clone(),
            change,
            previous_quantity,
            new_quantity: previous_quantity + change,
            mutation_type: MutationType::Sale,
            description: format!("POS sale - transaction #{transaction_number}"),
            related_transaction_id: transaction_id.clone(),
            user_id: request.user_id.clone(),
            user_name: request.user_name.clone(),
        }
    }

    /// Audit record for units returned to stock when a sale is rolled back.
    pub fn reversal(
        request: &SaleRequest,
        item: &LineItem,
        previous_quantity: i64,
        transaction_id: &DocumentId,
        transaction_number: &TransactionNumber,
    ) -> Self {
        let change = i64::from(item.quantity);
        Self {
            item_id: item.item_id.clone(),
            item_name: item.name.clone(),
            branch_id: request.branch_id.clone(),
            change,
            previous_quantity,
            new_quantity: previous_quantity + change,
            mutation_type: MutationType::SaleReversal,
            description: format!("Reversal of POS sale - transaction #{transaction_number}"),
            related_transaction_id: transaction_id.clone(),
            user_id: request.user_id.clone(),
            user_name: request.user_name.clone(),
        }
    }
}

/// Running totals kept on a customer profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub total_transactions: i64,
    #[serde(default)]
    pub total_spent: Money,
    #[serde(default)]
    pub last_transaction_date: Option<DateTime<Utc>>,
}

impl Customer {
    /// Totals after one more sale of `amount` at `at`.
    pub fn with_sale(&self, amount: Money, at: DateTime<Utc>) -> Result<Self, AmountOverflow> {
        Ok(Self {
            total_transactions: self
                .total_transactions
                .checked_add(1)
                .ok_or(AmountOverflow::new("totalTransactions"))?,
            total_spent: self
                .total_spent
                .checked_add(amount)
                .ok_or(AmountOverflow::new("totalSpent"))?,
            last_transaction_date: Some(at),
        })
    }

    /// Totals with the sale of `amount` made at `sold_at` taken back out.
    ///
    /// The last transaction date falls back to `previous_date` only while it
    /// still points at `sold_at`; a later sale's date is left alone.
    pub fn without_sale(
        &self,
        amount: Money,
        sold_at: DateTime<Utc>,
        previous_date: Option<DateTime<Utc>>,
    ) -> Result<Self, AmountOverflow> {
        let last_transaction_date = if self.last_transaction_date == Some(sold_at) {
            previous_date
        } else {
            self.last_transaction_date
        };
        Ok(Self {
            total_transactions: self
                .total_transactions
                .checked_sub(1)
                .ok_or(AmountOverflow::new("totalTransactions"))?,
            total_spent: self
                .total_spent
                .checked_sub(amount)
                .ok_or(AmountOverflow::new("totalSpent"))?,
            last_transaction_date,
        })
    }
}

/// Running totals of a cashier shift.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(default)]
    pub total_sales: Money,
    #[serde(default)]
    pub total_cash_payments: Money,
    #[serde(default)]
    pub total_other_payments: Money,
    #[serde(default)]
    pub discount_amount: Money,
}

impl Shift {
    /// Totals after one more sale, attributed to the payment method's bucket.
    pub fn with_sale(
        &self,
        total: Money,
        discount: Money,
        method: &PaymentMethod,
    ) -> Result<Self, AmountOverflow> {
        let add = |value: Money, by: Money, field| {
            value.checked_add(by).ok_or(AmountOverflow::new(field))
        };

        let mut next = self.clone();
        next.total_sales = add(self.total_sales, total, "totalSales")?;
        next.discount_amount = add(self.discount_amount, discount, "discountAmount")?;
        if method.is_cash() {
            next.total_cash_payments = add(self.total_cash_payments, total, "totalCashPayments")?;
        } else {
            next.total_other_payments =
                add(self.total_other_payments, total, "totalOtherPayments")?;
        }
        Ok(next)
    }
}
