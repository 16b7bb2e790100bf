//! Document store accessor.
//!
//! The store is the only shared mutable resource. Each record is written by
//! identifier through a single atomic update; there are no multi-record
//! transactions and no version tokens, so concurrent updates to the same
//! record resolve as last write wins.
//!
//! # Implementations
//!
//! - `PostgresRecordStore` (in `pharmadesk-postgres`): production
//! - `InMemoryRecordStore` (in `pharmadesk-testing`): tests and local development
//!
//! # Dyn Compatibility
//!
//! Methods return [`StoreFuture`] instead of `async fn` so the server can hold
//! the store as `Arc<dyn RecordStore>`.

use crate::record::{RequestId, RequestRecord, RequestStatus};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`RecordStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors raised by a [`RecordStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record matches the identifier.
    #[error("Request {0} not found")]
    NotFound(RequestId),

    /// Connection or query failure.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored document could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Access to the collection of request records.
pub trait RecordStore: Send + Sync {
    /// Atomically set `status` and `updatedAt` on the record matching `id`.
    ///
    /// `updatedAt` becomes `max(previous, at)`, so it never moves backwards
    /// for a given record. Business fields are left untouched.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no record matches; nothing is written.
    /// - [`StoreError::Database`] on backend failure.
    fn set_status<'a>(
        &'a self,
        id: &'a RequestId,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()>;

    /// Load one record.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if no record matches, or a backend error.
    fn get<'a>(&'a self, id: &'a RequestId) -> StoreFuture<'a, RequestRecord>;

    /// Load every record, most recently updated first (ties by id).
    ///
    /// # Errors
    ///
    /// Backend or decoding failure.
    fn list(&self) -> StoreFuture<'_, Vec<RequestRecord>>;
}

/// Order used by [`RecordStore::list`].
pub fn sort_for_listing(records: &mut [RequestRecord]) {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_sort_for_listing() {
        let base = Utc::now();
        let mut records = vec![
            RequestRecord::new("b", RequestStatus::Pending, base),
            RequestRecord::new("c", RequestStatus::Pending, base + Duration::seconds(5)),
            RequestRecord::new("a", RequestStatus::Pending, base),
        ];

        sort_for_listing(&mut records);

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn test_not_found_message() {
        let err = StoreError::NotFound(RequestId::new("req-9"));
        assert_eq!(err.to_string(), "Request req-9 not found");
    }
}
