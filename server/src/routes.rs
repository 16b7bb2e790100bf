//! Router configuration.

use crate::api::{self, auth, backup, email, requests, uploads};
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use pharmadesk_web::with_request_tracing;
use tower_http::services::ServeDir;

/// Build the complete Axum router.
///
/// Configures:
/// - Health check
/// - Admin login/logout
/// - Request listing and status updates
/// - Backup trigger
/// - Test email
/// - Uploads (receive and serve)
///
/// Every route runs behind request-id assignment and request tracing.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/requests", get(requests::list))
        .route("/requests/:id", get(requests::get).put(requests::update_status))
        .route("/backup", get(backup::status).post(backup::run))
        .route("/test-email", post(email::send_test))
        // Upload size is not capped.
        .route(
            "/uploads",
            post(uploads::upload).layer(DefaultBodyLimit::disable()),
        );

    let mut router = Router::new()
        .route("/health", get(api::health))
        .nest("/api", api_routes);

    let prefix = state.uploads.public_prefix();
    if prefix.starts_with('/') && prefix.len() > 1 {
        router = router.nest_service(prefix, ServeDir::new(state.uploads.dir()));
    } else {
        tracing::warn!(%prefix, "Upload prefix is not a local path; uploaded files are not served");
    }

    with_request_tracing(router.with_state(state))
}
