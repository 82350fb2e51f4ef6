//! Sale model: request, records and validation.

pub mod records;
pub mod request;
pub mod transaction_number;
pub mod validation;
pub mod value_objects;

pub use records::{
    Customer, InventoryItem, MutationType, RecordedTransaction, Shift, StockMutation,
    Transaction, TransactionStatus,
};
pub use request::{LineItem, SaleRequest};
pub use transaction_number::TransactionNumber;
pub use validation::{RequestValidator, SALE_SUBMISSION_METHOD, ValidatedSale};
pub use value_objects::{Money, PaymentMethod};
