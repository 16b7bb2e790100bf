//! Request listing and status updates.

use super::auth::AdminSession;
use super::{store_error, transition_error};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use pharmadesk_core::RequestId;
use pharmadesk_web::{JsonBody, WebResult};
use serde::Deserialize;
use serde_json::{Value, json};

/// `PUT /api/requests/{id}` body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Requested status; validated by the transition handler
    pub status: Option<String>,
}

/// `GET /api/requests`
///
/// Requires an admin session.
///
/// # Errors
///
/// 401 without a live session, 500 if the store fails.
pub async fn list(State(state): State<AppState>, _session: AdminSession) -> WebResult<Json<Value>> {
    let requests = state.store.list().await.map_err(store_error)?;
    Ok(Json(json!({ "success": true, "requests": requests })))
}

/// `GET /api/requests/{id}`
///
/// Requires an admin session.
///
/// # Errors
///
/// 401 without a live session, 404 for an unknown id, 500 if the store fails.
pub async fn get(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
) -> WebResult<Json<Value>> {
    let request = state
        .store
        .get(&RequestId::new(id))
        .await
        .map_err(store_error)?;
    Ok(Json(json!({ "success": true, "request": request })))
}

/// `PUT /api/requests/{id}`
///
/// # Errors
///
/// 400 for a missing or unrecognised status, 404 for an unknown id, 500 if
/// the store fails.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateStatusRequest>,
) -> WebResult<Json<Value>> {
    let change = state
        .transitions
        .apply(&id, body.status.as_deref())
        .await
        .map_err(transition_error)?;

    notify_customer(&state, &change.id).await;

    Ok(Json(json!({ "success": true })))
}

// Notification failures never fail the update.
async fn notify_customer(state: &AppState, id: &RequestId) {
    if !state.notifications.is_configured() {
        return;
    }

    let record = match state.store.get(id).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(request_id = %id, error = %e, "Could not load request for status email");
            return;
        }
    };

    if let Err(e) = state.notifications.status_changed(&record).await {
        tracing::warn!(request_id = %id, error = %e, "Status email not sent");
    }
}
