//! Handler errors and the JSON failure envelope.
//!
//! Every failure leaves the server as `{"success": false, "error": "<message>"}`
//! with the matching status code. The optional source error is logged for 5xx
//! responses and never sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Error returned by every handler.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let record = store.get(&id).await
///         .map_err(|_| AppError::not_found(format!("Request {id} not found")))?;
///     Ok(Json(record))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// Response status
    status: StatusCode,
    /// Sent to the client as `error`
    message: String,
    /// Error code (for logs)
    code: &'static str,
    /// Underlying cause; logged only
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Error with an explicit status and code.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Attach the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// 400 Bad Request (malformed or missing input).
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// 401 Unauthorized (bad credentials or API key).
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "UNAUTHORIZED")
    }

    /// 404 Not Found (unknown identifier).
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND")
    }

    /// 500 Internal Server Error (store or provider failure).
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// `{success: false, error}`
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        } else {
            tracing::debug!(status = %self.status, code = self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorResponse {
            success: false,
            error: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Unexpected failures become a generic 500.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_display_includes_code() {
        let err = AppError::bad_request("Status is required");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Status is required");
    }

    #[test]
    fn test_not_found_keeps_message() {
        let err = AppError::not_found("Request req-1 not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Request req-1 not found");
    }

    #[test]
    fn test_anyhow_hides_source_message() {
        let err = AppError::from(anyhow::anyhow!("connection refused on 10.0.0.5"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "An internal error occurred");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_body_is_success_false_envelope() {
        let response = AppError::unauthorized("Invalid credentials").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "error": "Invalid credentials" })
        );
    }
}
