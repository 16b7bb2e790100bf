//! Request ids and request tracing.
//!
//! # Flow
//!
//! 1. **Assign** an `x-request-id` (UUID v4) unless the client sent one
//! 2. **Trace** the request inside a span carrying that id
//! 3. **Echo** the id on the response

use axum::{Router, body::Body, http::Request};
use http::HeaderValue;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId as TowerRequestId, SetRequestIdLayer,
};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};
use uuid::Uuid;

/// Header name for the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generates UUID v4 request ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(TowerRequestId::new)
    }
}

/// Span for one HTTP request.
pub fn request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}

/// Wrap `router` with request-id assignment, tracing and propagation.
///
/// # Example
///
/// ```ignore
/// let app = with_request_tracing(Router::new().route("/health", get(health)));
/// ```
pub fn with_request_tracing<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // Router::layer wraps outside-in: the last layer runs first.
    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span::<Body>)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
