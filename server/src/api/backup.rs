//! Backup trigger.

use super::backup_error;
use crate::state::AppState;
use axum::{Json, extract::State};
use pharmadesk_web::{ApiKey, CorrelationId, WebResult};
use serde_json::{Value, json};

/// `GET /api/backup`
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "ready",
        "apiKeyRequired": state.backups.requires_api_key(),
    }))
}

/// `POST /api/backup`
///
/// # Errors
///
/// 401 when a configured API key is missing or wrong (the sink is never
/// called), 500 if reading or exporting fails.
pub async fn run(
    State(state): State<AppState>,
    CorrelationId(request_id): CorrelationId,
    api_key: ApiKey,
) -> WebResult<Json<Value>> {
    tracing::info!(%request_id, "Backup requested");

    let report = state
        .backups
        .run(api_key.as_deref())
        .await
        .map_err(backup_error)?;

    Ok(Json(json!({
        "success": true,
        "spreadsheetId": report.spreadsheet_id,
        "recordCount": report.record_count,
    })))
}
