//! Human-readable transaction numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A human-readable transaction number such as `TRX-1718000000123-9f1c2a7b`.
///
/// The millisecond timestamp keeps numbers ordered by commit time; the
/// random suffix separates sales committed in the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionNumber(String);

impl TransactionNumber {
    const PREFIX: &'static str = "TRX";

    /// Mints a new transaction number for a commit happening at `now`.
    pub fn mint(now: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}-{}-{}",
            Self::PREFIX,
            now.timestamp_millis(),
            &suffix[..8]
        ))
    }

    /// Returns the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the commit time in Unix milliseconds encoded in the number.
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.0.split('-').nth(1)?.parse().ok()
    }
}

impl std::fmt::Display for TransactionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
