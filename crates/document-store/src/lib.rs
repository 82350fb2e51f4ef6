pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::DocumentId;
pub use document::{Document, Fields, Version, Versioned};
pub use error::{DocumentStoreError, Result};
pub use memory::{InMemoryDocumentStore, StoreOperation};
pub use postgres::PostgresDocumentStore;
pub use store::{DocumentStore, DocumentStoreExt, UpdateOptions, to_fields};
