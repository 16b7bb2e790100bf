//! Axum glue for the Pharmadesk backend.
//!
//! Handlers live in `pharmadesk-server`; this crate holds the pieces every
//! handler shares.
//!
//! # Request Flow
//!
//! 1. **Request id** assigned (or kept from the client) and echoed back
//! 2. **Trace span** opened carrying method, URI and request id
//! 3. **Extract** input (JSON body, `x-api-key`, client IP)
//! 4. **Call** the workflow in `pharmadesk-core`
//! 5. **Map** the outcome to `{success: true, ...}` or an [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use pharmadesk_web::{AppError, JsonBody, WebResult};
//!
//! async fn update(
//!     State(state): State<AppState>,
//!     Path(id): Path<String>,
//!     JsonBody(body): JsonBody<UpdateStatus>,
//! ) -> WebResult<Json<Value>> {
//!     let change = state.transitions.apply(&id, body.status.as_deref()).await?;
//!     Ok(Json(json!({ "success": true, "request": change })))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod middleware;

pub use error::AppError;
pub use extractors::{API_KEY_HEADER, ApiKey, ClientIp, CorrelationId, JsonBody};
pub use middleware::{MakeRequestUuid, REQUEST_ID_HEADER, with_request_tracing};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
