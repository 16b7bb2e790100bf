//! Test email.

use super::notify_error;
use crate::state::AppState;
use axum::{Json, extract::State};
use pharmadesk_web::WebResult;
use serde::Deserialize;
use serde_json::{Value, json};

/// `POST /api/test-email` body.
#[derive(Debug, Default, Deserialize)]
pub struct TestEmailRequest {
    /// Recipient; the admin address is used when absent
    pub to: Option<String>,
}

/// `POST /api/test-email`
///
/// An absent or unparseable body is treated as `{}`.
///
/// # Errors
///
/// 500 when no recipient is available, the provider is not configured or
/// delivery fails.
pub async fn send_test(
    State(state): State<AppState>,
    body: Option<Json<TestEmailRequest>>,
) -> WebResult<Json<Value>> {
    let Json(body) = body.unwrap_or_default();

    let to = state
        .notifications
        .send_test(body.to.as_deref())
        .await
        .map_err(notify_error)?;

    Ok(Json(json!({ "success": true, "to": to })))
}
