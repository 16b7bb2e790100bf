//! Authentication configuration.
//!
//! Values are provided by the application at start-up, never read from the
//! environment here.

use crate::session::SameSitePolicy;

/// Default session cookie name.
pub const SESSION_COOKIE_NAME: &str = "admin_session";

/// Default session lifetime: 24 hours.
pub const SESSION_MAX_AGE_SECS: u32 = 86_400;

/// The single admin account.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    /// Create credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build credentials only when both parts are present and non-empty.
    #[must_use]
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some(Self::new(u, p)),
            _ => None,
        }
    }

    /// Configured username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Cookie name.
    ///
    /// Default: `admin_session`
    pub cookie_name: String,

    /// Cookie lifetime in seconds.
    ///
    /// Default: 86400 (24 hours)
    pub max_age: u32,

    /// Add the `Secure` attribute.
    ///
    /// Default: true
    pub secure: bool,

    /// `SameSite` policy.
    ///
    /// Default: Strict
    pub same_site: SameSitePolicy,
}

impl SessionConfig {
    /// Set the `Secure` flag.
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: SESSION_COOKIE_NAME.to_string(),
            max_age: SESSION_MAX_AGE_SECS,
            secure: true,
            same_site: SameSitePolicy::Strict,
        }
    }
}
