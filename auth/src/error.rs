//! Error types for admin authentication.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Authentication failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password did not match, or no admin account is configured.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Username or password was empty.
    #[error("Username and password are required")]
    MissingCredentials,

    /// No session cookie, or the token was never issued or has been revoked.
    #[error("Session not found")]
    SessionNotFound,

    /// The session outlived its cookie lifetime.
    #[error("Session expired")]
    SessionExpired,
}
