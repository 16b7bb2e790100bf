//! File uploads.

use super::upload_error;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use pharmadesk_web::{AppError, WebResult};
use serde_json::{Value, json};

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// `POST /api/uploads`
///
/// # Errors
///
/// 400 when the body is not multipart or has no `file` part, 500 if the file
/// cannot be written.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> WebResult<Json<Value>> {
    let mut multipart = multipart
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {}", e.body_text())))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {}", e.body_text())))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or(FILE_FIELD).to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {}", e.body_text())))?;

        let stored = state
            .uploads
            .receive(&original_name, &bytes)
            .await
            .map_err(upload_error)?;

        return Ok(Json(json!({ "success": true, "file": stored })));
    }

    Err(AppError::bad_request("No file uploaded"))
}
