//! HTTP handlers.
//!
//! Every handler answers `{success: true, ...}` on success and returns an
//! [`pharmadesk_web::AppError`] otherwise. Domain errors are mapped to
//! status codes here.

pub mod auth;
pub mod backup;
pub mod email;
pub mod requests;
pub mod uploads;

use pharmadesk_core::{BackupError, NotifyError, StoreError, TransitionError, UploadError};
use pharmadesk_web::AppError;

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

pub(crate) fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(id) => AppError::not_found(format!("Request {id} not found")),
        other => AppError::internal("Failed to access requests").with_source(other),
    }
}

pub(crate) fn transition_error(err: TransitionError) -> AppError {
    match err {
        TransitionError::MissingStatus | TransitionError::InvalidStatus(_) => {
            AppError::bad_request(err.to_string())
        }
        TransitionError::NotFound(id) => AppError::not_found(format!("Request {id} not found")),
        TransitionError::Store(source) => {
            AppError::internal("Failed to update request").with_source(source)
        }
    }
}

pub(crate) fn backup_error(err: BackupError) -> AppError {
    match err {
        BackupError::Unauthorized => AppError::unauthorized("Unauthorized"),
        BackupError::Store(source) => {
            AppError::internal("Backup failed: could not read requests").with_source(source)
        }
        BackupError::Export { reason } => AppError::internal(format!("Backup failed: {reason}")),
    }
}

// Every email failure is a 500, including a missing recipient and addresses
// the provider refuses.
pub(crate) fn notify_error(err: NotifyError) -> AppError {
    AppError::internal(format!("Failed to send email: {err}"))
}

pub(crate) fn upload_error(err: UploadError) -> AppError {
    AppError::internal("Failed to store upload").with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use pharmadesk_core::{InvalidStatus, RequestId, SinkError};

    #[test]
    fn test_transition_errors_map_to_status_codes() {
        assert_eq!(
            transition_error(TransitionError::MissingStatus).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            transition_error(TransitionError::InvalidStatus(InvalidStatus("done".into()))).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            transition_error(TransitionError::NotFound(RequestId::new("x"))).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            transition_error(TransitionError::Store(StoreError::Database("down".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_backup_export_reason_is_reported() {
        let err = backup_error(BackupError::Export {
            reason: SinkError::NotConfigured("no token".into()).to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("no token"));
    }

    #[test]
    fn test_every_email_failure_is_server_error() {
        for err in [
            NotifyError::NoRecipient,
            NotifyError::InvalidAddress("not-an-address".into()),
            NotifyError::NotConfigured("RESEND_API_KEY".into()),
            NotifyError::Delivery("provider returned 503".into()),
        ] {
            let mapped = notify_error(err);
            assert_eq!(mapped.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert!(mapped.message().starts_with("Failed to send email"));
        }
    }

    #[test]
    fn test_store_internals_are_not_exposed() {
        let err = store_error(StoreError::Database("password authentication failed".into()));
        assert_eq!(err.message(), "Failed to access requests");
    }
}
