//! Admin login and the sessions it issues.

use crate::config::{AdminCredentials, SessionConfig};
use crate::error::{AuthError, Result};
use crate::session::{SessionCookie, SessionToken};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Checks admin credentials, issues session cookies and remembers them.
///
/// Sessions live in process memory: a restart logs the admin out.
pub struct AdminAuthenticator {
    credentials: Option<AdminCredentials>,
    session: SessionConfig,
    // token -> expiry
    sessions: Mutex<HashMap<String, Instant>>,
}

impl AdminAuthenticator {
    /// Create an authenticator. Without credentials every login fails.
    #[must_use]
    pub fn new(credentials: Option<AdminCredentials>, session: SessionConfig) -> Self {
        Self {
            credentials,
            session,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Whether an admin account is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Session cookie settings.
    #[must_use]
    pub const fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    /// Verify credentials and issue a fresh session cookie.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredentials`] if either value is empty
    /// - [`AuthError::InvalidCredentials`] on mismatch or when no admin is configured
    pub fn login(&self, username: &str, password: &str) -> Result<SessionCookie> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(expected) = &self.credentials else {
            tracing::warn!("Admin login attempted but no admin account is configured");
            return Err(AuthError::InvalidCredentials);
        };

        // Compare both parts so timing does not reveal which one matched.
        let username_ok =
            constant_time_eq::constant_time_eq(username.as_bytes(), expected.username().as_bytes());
        let password_ok =
            constant_time_eq::constant_time_eq(password.as_bytes(), expected.password().as_bytes());

        if !(username_ok && password_ok) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = SessionToken::generate();
        let now = Instant::now();
        let expires_at = now + Duration::from_secs(u64::from(self.session.max_age));
        {
            let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.retain(|_, expiry| *expiry > now);
            sessions.insert(token.as_str().to_string(), expires_at);
        }

        Ok(SessionCookie::issue(&token, &self.session))
    }

    /// Check a token presented in the session cookie.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SessionNotFound`] if the token was never issued or was revoked
    /// - [`AuthError::SessionExpired`] once the cookie lifetime has passed
    pub fn verify(&self, token: &str) -> Result<()> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let expires_at = *sessions.get(token).ok_or(AuthError::SessionNotFound)?;

        if expires_at <= Instant::now() {
            sessions.remove(token);
            return Err(AuthError::SessionExpired);
        }
        Ok(())
    }

    /// Revoke `token` (if any) and return the cookie that clears it.
    #[must_use]
    pub fn logout(&self, token: Option<&str>) -> SessionCookie {
        if let Some(token) = token {
            self.sessions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(token);
        }
        SessionCookie::cleared(&self.session)
    }
}

impl fmt::Debug for AdminAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("AdminAuthenticator")
            .field("credentials", &self.credentials)
            .field("session", &self.session)
            .field("active_sessions", &active)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn authenticator() -> AdminAuthenticator {
        AdminAuthenticator::new(
            Some(AdminCredentials::new("admin", "hunter2")),
            SessionConfig::default(),
        )
    }

    #[test]
    fn test_correct_credentials_issue_cookie() {
        let cookie = authenticator().login("admin", "hunter2").unwrap();
        assert_eq!(cookie.name, "admin_session");
        assert_eq!(cookie.max_age, 86_400);
        assert!(cookie.http_only);
        assert_eq!(cookie.value.len(), 43);
    }

    #[test]
    fn test_each_login_gets_a_new_token() {
        let auth = authenticator();
        let first = auth.login("admin", "hunter2").unwrap();
        let second = auth.login("admin", "hunter2").unwrap();
        assert_ne!(first.value, second.value);
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        assert_eq!(
            authenticator().login("admin", "hunter3"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_unconfigured_rejects_everything() {
        let auth = AdminAuthenticator::new(None, SessionConfig::default());
        assert!(!auth.is_configured());
        assert_eq!(auth.login("admin", "hunter2"), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn test_empty_fields_are_missing() {
        assert_eq!(authenticator().login("", "x"), Err(AuthError::MissingCredentials));
        assert_eq!(authenticator().login("admin", ""), Err(AuthError::MissingCredentials));
    }

    #[test]
    fn test_issued_session_verifies_until_logout() {
        let auth = authenticator();
        let cookie = auth.login("admin", "hunter2").unwrap();
        assert_eq!(auth.verify(&cookie.value), Ok(()));

        let cleared = auth.logout(Some(&cookie.value));
        assert_eq!(cleared.max_age, 0);
        assert_eq!(auth.verify(&cookie.value), Err(AuthError::SessionNotFound));
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let auth = authenticator();
        let _ = auth.login("admin", "hunter2").unwrap();
        assert_eq!(auth.verify("forged"), Err(AuthError::SessionNotFound));
    }

    #[test]
    fn test_zero_lifetime_session_is_expired() {
        let auth = AdminAuthenticator::new(
            Some(AdminCredentials::new("admin", "hunter2")),
            SessionConfig {
                max_age: 0,
                ..SessionConfig::default()
            },
        );
        let cookie = auth.login("admin", "hunter2").unwrap();
        assert_eq!(auth.verify(&cookie.value), Err(AuthError::SessionExpired));
        assert_eq!(auth.verify(&cookie.value), Err(AuthError::SessionNotFound));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let auth = authenticator();
        let cookie = auth.login("admin", "hunter2").unwrap();
        let debug = format!("{auth:?}");
        assert!(!debug.contains(&cookie.value));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("active_sessions: 1"));
    }

    proptest! {
        #[test]
        fn prop_only_exact_pair_logs_in(user in "[a-z0-9]{1,12}", pass in "[a-z0-9]{1,12}") {
            let result = authenticator().login(&user, &pass);
            if user == "admin" && pass == "hunter2" {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result, Err(AuthError::InvalidCredentials));
            }
        }
    }
}
