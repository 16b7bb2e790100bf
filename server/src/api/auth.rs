//! Admin login, logout and the session guard.

use crate::state::AppState;
use axum::{
    Json, async_trait,
    extract::{FromRequestParts, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponse, Response},
};
use pharmadesk_auth::{AuthError, SessionCookie, cookie_value};
use pharmadesk_web::{AppError, ClientIp, JsonBody, WebResult};
use serde::Deserialize;
use serde_json::json;

/// `POST /api/auth/login` body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Admin username
    pub username: String,
    /// Admin password
    pub password: String,
}

/// `POST /api/auth/login`
///
/// # Errors
///
/// 401 on any credential mismatch; no cookie is set.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    JsonBody(request): JsonBody<LoginRequest>,
) -> WebResult<Response> {
    match state.auth.login(&request.username, &request.password) {
        Ok(cookie) => {
            metrics::counter!("pharmadesk_logins_total", "outcome" => "success").increment(1);
            tracing::info!(%client_ip, "Admin logged in");
            with_cookie(&cookie)
        }
        Err(_) => {
            metrics::counter!("pharmadesk_logins_total", "outcome" => "rejected").increment(1);
            tracing::warn!(%client_ip, username = %request.username, "Admin login rejected");
            Err(AppError::unauthorized("Invalid credentials"))
        }
    }
}

/// `POST /api/auth/logout`
///
/// Revokes the presented session, if any, and clears the cookie.
///
/// # Errors
///
/// Never in practice; the header value is built from a fixed cookie name.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> WebResult<Response> {
    let token = session_token(&headers, &state.auth.session_config().cookie_name);
    with_cookie(&state.auth.logout(token))
}

/// Proof that the request carries a live admin session.
///
/// Rejects with 401 when the cookie is missing, unknown, revoked or expired.
#[derive(Debug, Clone, Copy)]
pub struct AdminSession;

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, &state.auth.session_config().cookie_name)
            .ok_or(AuthError::SessionNotFound);

        match token.and_then(|token| state.auth.verify(token)) {
            Ok(()) => Ok(Self),
            Err(e) => {
                tracing::debug!(reason = %e, path = %parts.uri.path(), "Admin session rejected");
                Err(AppError::unauthorized("Unauthorized"))
            }
        }
    }
}

fn session_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| cookie_value(header, cookie_name))
}

fn with_cookie(cookie: &SessionCookie) -> WebResult<Response> {
    let header = HeaderValue::from_str(&cookie.to_header_value())
        .map_err(|e| AppError::internal("Failed to build session cookie").with_source(e))?;

    Ok(([(SET_COOKIE, header)], Json(json!({ "success": true }))).into_response())
}
