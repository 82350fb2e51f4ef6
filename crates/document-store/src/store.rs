use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Document, DocumentId, DocumentStoreError, Fields, Result, Version, Versioned};

/// Options for updating a document.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Expected version of the document for optimistic concurrency control.
    /// If None, no version check is performed (last write wins).
    pub expected_version: Option<Version>,
}

impl UpdateOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the document to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }
}

/// Core trait for document store implementations.
///
/// A document store offers create/read/update of single documents addressed
/// by collection and ID. There is no multi-document atomicity: every call
/// stands on its own. The only concurrency primitive is the conditional
/// update selected through [`UpdateOptions::expect_version`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a document.
    ///
    /// Fails with `NotFound` if the document does not exist.
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Document>;

    /// Creates a document.
    ///
    /// When `id` is None the store generates one. Fails with `AlreadyExists`
    /// if a caller-supplied ID is taken.
    async fn create(
        &self,
        collection: &str,
        id: Option<DocumentId>,
        fields: Fields,
    ) -> Result<Document>;

    /// Merges `fields` into an existing document and bumps its version.
    ///
    /// If `options.expected_version` is set, the operation fails with
    /// `VersionConflict` when the stored version differs.
    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
        options: UpdateOptions,
    ) -> Result<Document>;
}

/// Extension trait providing typed access on top of raw documents.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Reads a document and decodes it into a typed record.
    async fn get_as<T>(&self, collection: &str, id: &DocumentId) -> Result<Versioned<T>>
    where
        T: DeserializeOwned + Send,
    {
        let document = self.get(collection, id).await?;
        let record = document.decode()?;
        Ok(Versioned {
            id: document.id,
            version: document.version,
            record,
        })
    }

    /// Serializes a record and creates a document from it.
    async fn create_from<T>(
        &self,
        collection: &str,
        id: Option<DocumentId>,
        record: &T,
    ) -> Result<Document>
    where
        T: Serialize + Sync,
    {
        self.create(collection, id, to_fields(record)?).await
    }

    /// Serializes a partial record and merges it into a document.
    async fn update_from<T>(
        &self,
        collection: &str,
        id: &DocumentId,
        partial: &T,
        options: UpdateOptions,
    ) -> Result<Document>
    where
        T: Serialize + Sync,
    {
        self.update(collection, id, to_fields(partial)?, options)
            .await
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Serializes a value into a document field map.
///
/// The value must serialize to a JSON object.
pub fn to_fields<T: Serialize + ?Sized>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(fields) => Ok(fields),
        other => Err(DocumentStoreError::InvalidFields(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}
