//! Session tokens and the `Set-Cookie` header that carries them.

use crate::config::SessionConfig;
use base64::Engine;
use rand::RngCore;
use std::fmt;

/// Opaque session token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a cryptographically secure random token.
    ///
    /// Returns a 256-bit random token encoded as base64url (43 characters).
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut random_bytes = [0u8; 32];
        rng.fill_bytes(&mut random_bytes);
        Self(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes))
    }

    /// Token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// `SameSite` cookie policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSitePolicy {
    /// Strict (same-site only).
    Strict,

    /// Lax (cross-site GET allowed).
    Lax,

    /// None (cross-site allowed, requires Secure).
    None,
}

impl SameSitePolicy {
    /// Attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// A cookie ready to be rendered into a `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    /// Cookie name.
    pub name: String,

    /// Cookie value.
    pub value: String,

    /// Max age in seconds.
    pub max_age: u32,

    /// HTTP-only flag.
    pub http_only: bool,

    /// Secure flag.
    pub secure: bool,

    /// `SameSite` policy.
    pub same_site: SameSitePolicy,

    /// Cookie path.
    pub path: String,
}

impl SessionCookie {
    /// Cookie carrying `token` with the configured attributes.
    #[must_use]
    pub fn issue(token: &SessionToken, config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            value: token.as_str().to_string(),
            max_age: config.max_age,
            http_only: true,
            secure: config.secure,
            same_site: config.same_site,
            path: "/".to_string(),
        }
    }

    /// Cookie that makes the browser drop the session immediately.
    #[must_use]
    pub fn cleared(config: &SessionConfig) -> Self {
        Self {
            value: String::new(),
            max_age: 0,
            ..Self::issue(&SessionToken(String::new()), config)
        }
    }

    /// Render as a `Set-Cookie` header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Path={}; Max-Age={}",
            self.name, self.value, self.path, self.max_age
        );
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header.push_str("; SameSite=");
        header.push_str(self.same_site.as_str());
        header
    }
}

/// Value of cookie `name` in a `Cookie` request header.
///
/// Returns `None` for a missing or empty value.
#[must_use]
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value_finds_named_cookie() {
        let header = "theme=dark; admin_session=tok123; other=1";
        assert_eq!(cookie_value(header, "admin_session"), Some("tok123"));
        assert_eq!(cookie_value("admin_session=solo", "admin_session"), Some("solo"));
    }

    #[test]
    fn test_cookie_value_ignores_lookalikes_and_empty() {
        assert_eq!(cookie_value("xadmin_session=tok", "admin_session"), None);
        assert_eq!(cookie_value("admin_session=", "admin_session"), None);
        assert_eq!(cookie_value("", "admin_session"), None);
    }

    #[test]
    fn test_token_is_43_url_safe_chars() {
        let token = SessionToken::generate();
        assert_eq!(token.as_str().len(), 43);
        assert!(
            token
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(token, SessionToken::generate());
    }

    #[test]
    fn test_issued_cookie_header() {
        let token = SessionToken("abc".into());
        let cookie = SessionCookie::issue(&token, &SessionConfig::default());
        assert_eq!(
            cookie.to_header_value(),
            "admin_session=abc; Path=/; Max-Age=86400; HttpOnly; Secure; SameSite=Strict"
        );
    }

    #[test]
    fn test_insecure_cookie_omits_secure() {
        let token = SessionToken("abc".into());
        let config = SessionConfig::default().with_secure(false);
        let header = SessionCookie::issue(&token, &config).to_header_value();
        assert!(!header.contains("Secure"));
        assert!(header.contains("HttpOnly"));
    }

    #[test]
    fn test_cleared_cookie_expires_now() {
        let header = SessionCookie::cleared(&SessionConfig::default()).to_header_value();
        assert!(header.starts_with("admin_session=; Path=/; Max-Age=0"));
    }

    #[test]
    fn test_debug_hides_token() {
        let token = SessionToken("secret-value".into());
        assert!(!format!("{token:?}").contains("secret-value"));
    }
}
