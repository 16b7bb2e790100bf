//! In-memory record store.
//!
//! Backs tests and local development when no database is configured. Every
//! successful `set_status` bumps a write counter so tests can assert that a
//! rejected request never reached the store.

use pharmadesk_core::store::sort_for_listing;
use pharmadesk_core::{RecordStore, RequestId, RequestRecord, RequestStatus, StoreError, StoreFuture};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// `HashMap`-backed [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<Mutex<HashMap<RequestId, RequestRecord>>>,
    writes: Arc<AtomicUsize>,
    failure: Arc<Mutex<Option<String>>>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `records`.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = RequestRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert or replace a record. Does not count as a write.
    pub fn insert(&self, record: RequestRecord) {
        self.lock().insert(record.id.clone(), record);
    }

    /// Snapshot of one record.
    #[must_use]
    pub fn record(&self, id: &str) -> Option<RequestRecord> {
        self.lock().get(&RequestId::new(id)).cloned()
    }

    /// Number of successful status writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with a database error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self
            .failure
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(message.into());
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match self
            .failure
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
        {
            Some(message) => Err(StoreError::Database(message.clone())),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestId, RequestRecord>> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn set_status<'a>(
        &'a self,
        id: &'a RequestId,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.check_failure()?;

            let mut records = self.lock();
            let record = records
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;

            record.status = status;
            record.updated_at = record.updated_at.max(at);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn get<'a>(&'a self, id: &'a RequestId) -> StoreFuture<'a, RequestRecord> {
        Box::pin(async move {
            self.check_failure()?;
            self.lock()
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.clone()))
        })
    }

    fn list(&self) -> StoreFuture<'_, Vec<RequestRecord>> {
        Box::pin(async move {
            self.check_failure()?;
            let mut records: Vec<RequestRecord> = self.lock().values().cloned().collect();
            sort_for_listing(&mut records);
            Ok(records)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures;
    use chrono::Duration;

    #[tokio::test]
    async fn test_set_status_never_moves_updated_at_backwards() {
        let store = InMemoryRecordStore::with_records([fixtures::pending("req-1")]);
        let before = store.record("req-1").unwrap().updated_at;

        store
            .set_status(&RequestId::new("req-1"), RequestStatus::Completed, before - Duration::hours(1))
            .await
            .unwrap();

        let after = store.record("req-1").unwrap();
        assert_eq!(after.status, RequestStatus::Completed);
        assert_eq!(after.updated_at, before);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = InMemoryRecordStore::new();
        let result = store
            .set_status(&RequestId::new("nope"), RequestStatus::Pending, Utc::now())
            .await;
        assert_eq!(result, Err(StoreError::NotFound(RequestId::new("nope"))));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_fail_with_breaks_every_call() {
        let store = InMemoryRecordStore::with_records([fixtures::pending("req-1")]);
        store.fail_with("connection reset");

        assert_eq!(
            store.list().await,
            Err(StoreError::Database("connection reset".into()))
        );
        assert!(store.get(&RequestId::new("req-1")).await.is_err());
    }
}
