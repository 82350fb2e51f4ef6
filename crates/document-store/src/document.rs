use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{DocumentId, Result};

/// The field map of a stored document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Version number of a document, used for optimistic concurrency control.
///
/// A created document starts at version 1 and every successful update
/// increments it by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version (0) of a document that does not exist.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version (1) of a freshly created document.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A document as held by the store, with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// The document ID, unique within its collection.
    pub id: DocumentId,

    /// The collection the document belongs to.
    pub collection: String,

    /// Current version, bumped by every write.
    pub version: Version,

    /// The document body.
    pub fields: Fields,

    /// When the document was created.
    pub created_at: DateTime<Utc>,

    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Decodes the document body into a typed record.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        let value = serde_json::Value::Object(self.fields.clone());
        Ok(serde_json::from_value(value)?)
    }

    /// Returns a single field, if present.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// Merges partial fields into the body, overwriting existing keys.
    pub(crate) fn merge(&mut self, partial: Fields) {
        for (key, value) in partial {
            self.fields.insert(key, value);
        }
    }
}

/// A typed record read from the store together with the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub id: DocumentId,
    pub version: Version,
    pub record: T,
}
