//! Custom Axum extractors.
//!
//! - `JsonBody`: JSON body whose rejection is a 400 [`AppError`] envelope
//! - `ApiKey`: the optional `x-api-key` header
//! - `ClientIp`: client IP address from proxy headers or the connection
//! - `CorrelationId`: the request id assigned by the request-id middleware

use crate::error::AppError;
use crate::middleware::REQUEST_ID_HEADER;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Request, connect_info::ConnectInfo, rejection::JsonRejection},
    http::{HeaderMap, request::Parts},
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Header carrying the backup shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// JSON request body.
///
/// Same as [`axum::Json`] except that a missing content type, malformed JSON
/// or a shape mismatch becomes a 400 with the standard error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::bad_request(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        }
    }
}

/// Value of the `x-api-key` header, if present and valid UTF-8.
#[derive(Debug, Clone, Default)]
pub struct ApiKey(pub Option<String>);

impl ApiKey {
    /// Borrow the key.
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            parts
                .headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        ))
    }
}

/// Client IP address.
///
/// # Priority
///
/// 1. `X-Forwarded-For` (first IP in the list)
/// 2. `X-Real-IP`
/// 3. Connection IP (when served with connect info)
/// 4. `127.0.0.1`
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip = extract_client_ip(&parts.headers, parts.extensions.get());

        Ok(Self(ip))
    }
}

fn extract_client_ip(headers: &HeaderMap, connect_info: Option<&ConnectInfo<SocketAddr>>) -> IpAddr {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    let real_ip = || {
        headers
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    forwarded
        .or_else(real_ip)
        .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Request id for log correlation.
///
/// Reads the `x-request-id` header set by the request-id middleware; `"-"`
/// when the middleware is not installed.
#[derive(Debug, Clone)]
pub struct CorrelationId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        Ok(Self(id))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use serde::Deserialize;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).expect("Valid request").into_parts().0
    }

    #[tokio::test]
    async fn test_api_key_from_header() {
        let mut parts = parts(axum::http::Request::builder().header(API_KEY_HEADER, "s3cret"));
        let key = ApiKey::from_request_parts(&mut parts, &()).await.expect("Should extract");
        assert_eq!(key.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn test_api_key_absent() {
        let mut parts = parts(axum::http::Request::builder());
        let key = ApiKey::from_request_parts(&mut parts, &()).await.expect("Should extract");
        assert_eq!(key.as_deref(), None);
    }

    #[tokio::test]
    async fn test_client_ip_from_x_forwarded_for() {
        let mut parts = parts(
            axum::http::Request::builder().header("X-Forwarded-For", "203.0.113.1, 198.51.100.1"),
        );
        let client_ip = ClientIp::from_request_parts(&mut parts, &()).await.expect("Should extract");
        assert_eq!(client_ip.0.to_string(), "203.0.113.1");
    }

    #[tokio::test]
    async fn test_client_ip_from_x_real_ip() {
        let mut parts = parts(axum::http::Request::builder().header("X-Real-IP", "198.51.100.42"));
        let client_ip = ClientIp::from_request_parts(&mut parts, &()).await.expect("Should extract");
        assert_eq!(client_ip.0.to_string(), "198.51.100.42");
    }

    #[tokio::test]
    async fn test_client_ip_from_connect_info() {
        let mut parts = parts(axum::http::Request::builder());
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 7], 4000))));
        let client_ip = ClientIp::from_request_parts(&mut parts, &()).await.expect("Should extract");
        assert_eq!(client_ip.0.to_string(), "192.0.2.7");
    }

    #[tokio::test]
    async fn test_client_ip_fallback() {
        let mut parts = parts(axum::http::Request::builder());
        let client_ip = ClientIp::from_request_parts(&mut parts, &()).await.expect("Should extract");
        assert_eq!(client_ip.0.to_string(), "127.0.0.1");
    }

    #[derive(Debug, Deserialize)]
    struct Login {
        username: String,
    }

    #[tokio::test]
    async fn test_json_body_parses() {
        let req = axum::http::Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"username":"admin"}"#))
            .expect("Valid request");
        let JsonBody(login) = JsonBody::<Login>::from_request(req, &())
            .await
            .expect("Should parse");
        assert_eq!(login.username, "admin");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let req = axum::http::Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("Valid request");
        let err = JsonBody::<Login>::from_request(req, &())
            .await
            .expect_err("Should reject");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("Invalid request body"));
    }
}
