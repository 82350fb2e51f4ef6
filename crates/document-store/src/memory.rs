use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    Document, DocumentId, DocumentStoreError, Fields, Result, Version,
    store::{DocumentStore, UpdateOptions},
};

/// A store operation, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Get,
    Create,
    Update,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    collection: String,
    operation: StoreOperation,
    id: Option<DocumentId>,
}

impl InjectedFailure {
    fn matches(&self, collection: &str, operation: StoreOperation, id: Option<&DocumentId>) -> bool {
        self.collection == collection
            && self.operation == operation
            && match (&self.id, id) {
                (None, _) => true,
                (Some(expected), Some(actual)) => expected == actual,
                (Some(_), None) => false,
            }
    }
}

#[derive(Debug, Default)]
struct InMemoryState {
    collections: HashMap<String, BTreeMap<DocumentId, Document>>,
    failures: Vec<InjectedFailure>,
}

impl InMemoryState {
    /// Consumes the first injected failure matching the call, if any.
    fn take_failure(
        &mut self,
        collection: &str,
        operation: StoreOperation,
        id: Option<&DocumentId>,
    ) -> Result<()> {
        if let Some(pos) = self
            .failures
            .iter()
            .position(|f| f.matches(collection, operation, id))
        {
            self.failures.remove(pos);
            return Err(DocumentStoreError::Unavailable(format!(
                "injected {operation:?} failure on {collection}"
            )));
        }
        Ok(())
    }
}

/// In-memory document store implementation.
///
/// Holds every collection in memory and provides the same interface as the
/// PostgreSQL implementation, plus inspection helpers and one-shot failure
/// injection for exercising partial-failure paths.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in a collection.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Returns all documents of a collection, ordered by ID.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.state
            .read()
            .await
            .collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Inserts or replaces a document without any checks.
    ///
    /// The stored document starts at version 1.
    pub async fn insert_raw(
        &self,
        collection: &str,
        id: impl Into<DocumentId>,
        fields: serde_json::Value,
    ) -> Document {
        let now = Utc::now();
        let document = Document {
            id: id.into(),
            collection: collection.to_string(),
            version: Version::first(),
            fields: match fields {
                serde_json::Value::Object(map) => map,
                _ => Fields::new(),
            },
            created_at: now,
            updated_at: now,
        };

        self.state
            .write()
            .await
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document.clone());
        document
    }

    /// Makes the next `operation` on `collection` fail with `Unavailable`.
    pub async fn fail_on(&self, collection: &str, operation: StoreOperation) {
        self.state.write().await.failures.push(InjectedFailure {
            collection: collection.to_string(),
            operation,
            id: None,
        });
    }

    /// Makes the next `operation` on one specific document fail with `Unavailable`.
    pub async fn fail_on_document(
        &self,
        collection: &str,
        operation: StoreOperation,
        id: impl Into<DocumentId>,
    ) {
        self.state.write().await.failures.push(InjectedFailure {
            collection: collection.to_string(),
            operation,
            id: Some(id.into()),
        });
    }

    /// Clears all documents and injected failures.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.collections.clear();
        state.failures.clear();
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Document> {
        let mut state = self.state.write().await;
        state.take_failure(collection, StoreOperation::Get, Some(id))?;

        state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| DocumentStoreError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            })
    }

    async fn create(
        &self,
        collection: &str,
        id: Option<DocumentId>,
        fields: Fields,
    ) -> Result<Document> {
        let mut state = self.state.write().await;
        state.take_failure(collection, StoreOperation::Create, id.as_ref())?;

        let id = id.unwrap_or_else(DocumentId::generate);
        let docs = state.collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(DocumentStoreError::AlreadyExists {
                collection: collection.to_string(),
                id,
            });
        }

        let now = Utc::now();
        let document = Document {
            id: id.clone(),
            collection: collection.to_string(),
            version: Version::first(),
            fields,
            created_at: now,
            updated_at: now,
        };
        docs.insert(id, document.clone());

        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
        options: UpdateOptions,
    ) -> Result<Document> {
        let mut state = self.state.write().await;
        state.take_failure(collection, StoreOperation::Update, Some(id))?;

        let document = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| DocumentStoreError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            })?;

        // Check expected version if specified
        if let Some(expected) = options.expected_version
            && document.version != expected
        {
            return Err(DocumentStoreError::VersionConflict {
                collection: collection.to_string(),
                id: id.clone(),
                expected,
                actual: document.version,
            });
        }

        document.merge(fields);
        document.version = document.version.next();
        document.updated_at = Utc::now();

        Ok(document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryDocumentStore::new();
        let created = store
            .create("items", Some(DocumentId::new("A")), fields(json!({"quantity": 10})))
            .await
            .unwrap();

        assert_eq!(created.version, Version::first());

        let loaded = store.get("items", &DocumentId::new("A")).await.unwrap();
        assert_eq!(loaded.field("quantity"), Some(&json!(10)));
        assert_eq!(store.document_count("items").await, 1);
    }

    #[tokio::test]
    async fn test_create_generates_id() {
        let store = InMemoryDocumentStore::new();
        let a = store.create("txns", None, Fields::new()).await.unwrap();
        let b = store.create("txns", None, Fields::new()).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.document_count("txns").await, 2);
    }

    #[tokio::test]
    async fn test_create_duplicate_id_fails() {
        let store = InMemoryDocumentStore::new();
        store
            .create("items", Some(DocumentId::new("A")), Fields::new())
            .await
            .unwrap();

        let result = store
            .create("items", Some(DocumentId::new("A")), Fields::new())
            .await;
        assert!(matches!(
            result,
            Err(DocumentStoreError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let result = store.get("items", &DocumentId::new("missing")).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_merges_and_bumps_version() {
        let store = InMemoryDocumentStore::new();
        store
            .insert_raw("items", "A", json!({"quantity": 10, "name": "Widget"}))
            .await;

        let updated = store
            .update(
                "items",
                &DocumentId::new("A"),
                fields(json!({"quantity": 7})),
                UpdateOptions::new(),
            )
            .await
            .unwrap();

        assert_eq!(updated.version, Version::new(2));
        assert_eq!(updated.field("quantity"), Some(&json!(7)));
        assert_eq!(updated.field("name"), Some(&json!("Widget")));
    }

    #[tokio::test]
    async fn test_conditional_update_conflict() {
        let store = InMemoryDocumentStore::new();
        store.insert_raw("items", "A", json!({"quantity": 10})).await;
        let id = DocumentId::new("A");

        // Someone else writes first
        store
            .update("items", &id, fields(json!({"quantity": 9})), UpdateOptions::new())
            .await
            .unwrap();

        let result = store
            .update(
                "items",
                &id,
                fields(json!({"quantity": 7})),
                UpdateOptions::expect_version(Version::first()),
            )
            .await;

        match result {
            Err(DocumentStoreError::VersionConflict {
                expected, actual, ..
            }) => {
                assert_eq!(expected, Version::first());
                assert_eq!(actual, Version::new(2));
            }
            other => panic!("expected version conflict, got {other:?}"),
        }

        let doc = store.get("items", &id).await.unwrap();
        assert_eq!(doc.field("quantity"), Some(&json!(9)));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let result = store
            .update(
                "items",
                &DocumentId::new("nope"),
                Fields::new(),
                UpdateOptions::new(),
            )
            .await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let store = InMemoryDocumentStore::new();
        store.insert_raw("items", "A", json!({"quantity": 1})).await;
        store.fail_on("items", StoreOperation::Get).await;

        let id = DocumentId::new("A");
        assert!(matches!(
            store.get("items", &id).await,
            Err(DocumentStoreError::Unavailable(_))
        ));
        assert!(store.get("items", &id).await.is_ok());
    }

    #[tokio::test]
    async fn test_injected_failure_targets_document() {
        let store = InMemoryDocumentStore::new();
        store.insert_raw("items", "A", json!({"quantity": 1})).await;
        store.insert_raw("items", "B", json!({"quantity": 1})).await;
        store
            .fail_on_document("items", StoreOperation::Update, "B")
            .await;

        let ok = store
            .update("items", &DocumentId::new("A"), Fields::new(), UpdateOptions::new())
            .await;
        assert!(ok.is_ok());

        let failed = store
            .update("items", &DocumentId::new("B"), Fields::new(), UpdateOptions::new())
            .await;
        assert!(matches!(failed, Err(DocumentStoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryDocumentStore::new();
        store.insert_raw("items", "A", json!({})).await;
        store.fail_on("items", StoreOperation::Get).await;
        store.clear().await;

        assert_eq!(store.document_count("items").await, 0);
        assert!(store.get("items", &DocumentId::new("A")).await.unwrap_err().is_not_found());
    }
}
