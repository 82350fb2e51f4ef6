//! Value objects for the sale domain.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Money amount in the currency's minor unit.
///
/// Serialized as a bare JSON integer, the way tills send amounts. Integer
/// arithmetic keeps `change = amountPaid - totalAmount` exact. Amounts come
/// from clients, so arithmetic is checked only.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new Money amount from minor units.
    pub fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the amount in minor units.
    pub fn amount(&self) -> i64 {
        self.0
    }

    /// Adds `rhs`, or returns None if the sum leaves the `i64` range.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Subtracts `rhs`, or returns None if the difference leaves the `i64` range.
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

/// How the customer paid.
///
/// `"cash"` is the only method with its own bucket in the shift totals;
/// every other label lands in the catch-all "other" bucket but is kept
/// verbatim on the transaction record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Cash,
    Other(String),
}

impl PaymentMethod {
    const CASH: &'static str = "cash";

    /// Parses a payment method label.
    pub fn parse(label: &str) -> Self {
        if label == Self::CASH {
            PaymentMethod::Cash
        } else {
            PaymentMethod::Other(label.to_string())
        }
    }

    /// Returns true for cash payments.
    pub fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }

    /// Returns the label as sent by the client.
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => Self::CASH,
            PaymentMethod::Other(label) => label,
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Other("other".to_string())
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(PaymentMethod::parse(&label))
    }
}
