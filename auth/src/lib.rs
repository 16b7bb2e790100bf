//! # Pharmadesk Admin Authentication
//!
//! Single-account admin login for the pharmacy dashboard.
//!
//! ## Features
//!
//! - **Constant-time credential check**: username and password are compared
//!   with `constant_time_eq`
//! - **Opaque session tokens**: 256-bit random values, base64url encoded
//! - **Hardened cookies**: `HttpOnly`, `SameSite=Strict`, 24 hour lifetime,
//!   `Secure` outside development
//! - **Server-side sessions**: issued tokens are remembered until logout or
//!   expiry, so a cookie is only honoured if this process issued it
//!
//! ## Example
//!
//! ```rust,ignore
//! use pharmadesk_auth::*;
//!
//! let auth = AdminAuthenticator::new(
//!     Some(AdminCredentials::new("admin", "hunter2")),
//!     SessionConfig::default(),
//! );
//!
//! let cookie = auth.login("admin", "hunter2")?;
//! response.headers_mut().insert(SET_COOKIE, cookie.to_header_value().parse()?);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod error;
pub mod session;

mod admin;

pub use admin::AdminAuthenticator;
pub use config::{AdminCredentials, SessionConfig};
pub use error::{AuthError, Result};
pub use session::{SameSitePolicy, SessionCookie, SessionToken, cookie_value};
