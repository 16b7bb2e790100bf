//! Status Transition Handler.
//!
//! Validates a requested status and applies it to a single record through the
//! store's atomic update. The three statuses form an unordered set: there is
//! no transition graph, so `completed -> pending` and same-value updates are
//! accepted. Only `updatedAt` changes on a same-value update.

use crate::environment::Clock;
use crate::record::{InvalidStatus, RequestId, RequestStatus};
use crate::store::{RecordStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Why a transition was refused or failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// No status was supplied.
    #[error("Status is required")]
    MissingStatus,

    /// The status is not one of the recognised values.
    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatus),

    /// No record matches the identifier.
    #[error("Request {0} not found")]
    NotFound(RequestId),

    /// The store failed.
    #[error("Failed to update request: {0}")]
    Store(StoreError),
}

impl From<StoreError> for TransitionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// A successfully applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// Record that was updated.
    pub id: RequestId,
    /// Status now stored.
    pub status: RequestStatus,
    /// Timestamp handed to the store.
    pub updated_at: DateTime<Utc>,
}

/// Applies status changes to records.
#[derive(Clone)]
pub struct StatusTransitionHandler {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl StatusTransitionHandler {
    /// Create a handler over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Validate `requested` and apply it to the record `id`.
    ///
    /// Validation happens before the store is touched, so a rejected status
    /// never mutates anything.
    ///
    /// # Errors
    ///
    /// - [`TransitionError::MissingStatus`] if `requested` is absent or empty
    /// - [`TransitionError::InvalidStatus`] if it is not a recognised status
    /// - [`TransitionError::NotFound`] if no record matches `id`
    /// - [`TransitionError::Store`] on store failure
    pub async fn apply(
        &self,
        id: &str,
        requested: Option<&str>,
    ) -> Result<StatusChange, TransitionError> {
        let status = match requested {
            None | Some("") => {
                tracing::warn!(request_id = %id, "Status update rejected: missing status");
                return Err(TransitionError::MissingStatus);
            }
            Some(raw) => raw.parse::<RequestStatus>().inspect_err(|_| {
                tracing::warn!(request_id = %id, requested = %raw, "Status update rejected: invalid status");
            })?,
        };

        let id = RequestId::new(id);
        let at = self.clock.now();

        self.store.set_status(&id, status, at).await?;

        metrics::counter!("pharmadesk_status_transitions_total", "status" => status.as_str())
            .increment(1);
        tracing::info!(request_id = %id, status = %status, "Request status updated");

        Ok(StatusChange {
            id,
            status,
            updated_at: at,
        })
    }
}
