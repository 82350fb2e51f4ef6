use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Document, DocumentId, DocumentStoreError, Fields, Result, Version,
    store::{DocumentStore, UpdateOptions},
};

/// PostgreSQL-backed document store implementation.
///
/// All collections share one `documents` table keyed by
/// `(database_id, collection, id)`; the body lives in a JSONB column.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
    database_id: String,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store scoped to one logical database.
    pub fn new(pool: PgPool, database_id: impl Into<String>) -> Self {
        Self {
            pool,
            database_id: database_id.into(),
        }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the logical database this store reads and writes.
    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        let fields_json: serde_json::Value = row.try_get("fields")?;
        let fields = match fields_json {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(DocumentStoreError::InvalidFields(format!(
                    "stored document body is not an object: {other}"
                )));
            }
        };

        Ok(Document {
            id: DocumentId::new(row.try_get::<String, _>("id")?),
            collection: row.try_get("collection")?,
            version: Version::new(row.try_get("version")?),
            fields,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    async fn current_version(&self, collection: &str, id: &DocumentId) -> Result<Option<Version>> {
        let version: Option<i64> = sqlx::query_scalar(
            "SELECT version FROM documents WHERE database_id = $1 AND collection = $2 AND id = $3",
        )
        .bind(&self.database_id)
        .bind(collection)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(version.map(Version::new))
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[tracing::instrument(skip(self), fields(database_id = %self.database_id))]
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Document> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT collection, id, version, fields, created_at, updated_at
            FROM documents
            WHERE database_id = $1 AND collection = $2 AND id = $3
            "#,
        )
        .bind(&self.database_id)
        .bind(collection)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_document(row),
            None => Err(DocumentStoreError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            }),
        }
    }

    #[tracing::instrument(skip(self, fields), fields(database_id = %self.database_id))]
    async fn create(
        &self,
        collection: &str,
        id: Option<DocumentId>,
        fields: Fields,
    ) -> Result<Document> {
        let id = id.unwrap_or_else(DocumentId::generate);

        let row = sqlx::query(
            r#"
            INSERT INTO documents (database_id, collection, id, version, fields)
            VALUES ($1, $2, $3, 1, $4)
            RETURNING collection, id, version, fields, created_at, updated_at
            "#,
        )
        .bind(&self.database_id)
        .bind(collection)
        .bind(id.as_str())
        .bind(serde_json::Value::Object(fields))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // A primary key violation means the caller-supplied ID is taken
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("documents_pkey")
            {
                return DocumentStoreError::AlreadyExists {
                    collection: collection.to_string(),
                    id: id.clone(),
                };
            }
            DocumentStoreError::Database(e)
        })?;

        Self::row_to_document(row)
    }

    #[tracing::instrument(skip(self, fields), fields(database_id = %self.database_id))]
    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
        options: UpdateOptions,
    ) -> Result<Document> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            UPDATE documents
            SET fields = fields || $4,
                version = version + 1,
                updated_at = NOW()
            WHERE database_id = $1 AND collection = $2 AND id = $3
              AND ($5::BIGINT IS NULL OR version = $5)
            RETURNING collection, id, version, fields, created_at, updated_at
            "#,
        )
        .bind(&self.database_id)
        .bind(collection)
        .bind(id.as_str())
        .bind(serde_json::Value::Object(fields))
        .bind(options.expected_version.map(|v| v.as_i64()))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Self::row_to_document(row);
        }

        // Nothing matched: either the document is missing or the version moved
        match (self.current_version(collection, id).await?, options.expected_version) {
            (Some(actual), Some(expected)) => Err(DocumentStoreError::VersionConflict {
                collection: collection.to_string(),
                id: id.clone(),
                expected,
                actual,
            }),
            _ => Err(DocumentStoreError::NotFound {
                collection: collection.to_string(),
                id: id.clone(),
            }),
        }
    }
}
