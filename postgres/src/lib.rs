//! `PostgreSQL` record store for Pharmadesk.
//!
//! Implements [`RecordStore`] over a single `requests` table. Business fields
//! live in a `JSONB` document column; only `status` and `updated_at` are ever
//! written by the backend.
//!
//! # Example
//!
//! ```ignore
//! use pharmadesk_postgres::PostgresRecordStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresRecordStore::connect("postgres://localhost/pharmacy", 10).await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use pharmadesk_core::{
    RecordStore, RequestId, RequestRecord, RequestStatus, StoreError, StoreFuture,
};
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;

/// `PostgreSQL`-backed [`RecordStore`].
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Connect with a pool of at most `max_connections`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] if the pool cannot be established.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to connect: {e}")))?;

        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))
    }

    /// Insert or replace a whole record.
    ///
    /// Requests are created by the customer-facing form, not by this backend;
    /// this exists for seeding and tests.
    ///
    /// # Errors
    ///
    /// [`StoreError::Database`] on query failure.
    pub async fn insert(&self, record: &RequestRecord) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO requests (id, status, updated_at, document)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
                SET status = EXCLUDED.status,
                    updated_at = EXCLUDED.updated_at,
                    document = EXCLUDED.document
            ",
        )
        .bind(record.id.as_str())
        .bind(record.status.as_str())
        .bind(record.updated_at)
        .bind(Json(&record.fields))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to insert request: {e}")))?;
        Ok(())
    }
}

fn row_to_record(row: &PgRow) -> Result<RequestRecord, StoreError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    let updated_at: DateTime<Utc> = row
        .try_get("updated_at")
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    let Json(fields): Json<Map<String, Value>> = row
        .try_get("document")
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    let status = status
        .parse::<RequestStatus>()
        .map_err(|e| StoreError::Serialization(format!("request {id}: {e}")))?;

    Ok(RequestRecord {
        id: RequestId::new(id),
        status,
        updated_at,
        fields,
    })
}

impl RecordStore for PostgresRecordStore {
    fn set_status<'a>(
        &'a self,
        id: &'a RequestId,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            // GREATEST keeps updated_at monotonic under concurrent writers.
            let result = sqlx::query(
                r"
                UPDATE requests
                SET status = $2, updated_at = GREATEST(updated_at, $3)
                WHERE id = $1
                ",
            )
            .bind(id.as_str())
            .bind(status.as_str())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to update status: {e}")))?;

            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(id.clone()));
            }
            Ok(())
        })
    }

    fn get<'a>(&'a self, id: &'a RequestId) -> StoreFuture<'a, RequestRecord> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT id, status, updated_at, document FROM requests WHERE id = $1",
            )
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to get request: {e}")))?
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

            row_to_record(&row)
        })
    }

    fn list(&self) -> StoreFuture<'_, Vec<RequestRecord>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT id, status, updated_at, document FROM requests ORDER BY updated_at DESC, id",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to list requests: {e}")))?;

            rows.iter().map(row_to_record).collect()
        })
    }
}
