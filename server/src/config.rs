//! Configuration management for the pharmacy backend.
//!
//! Loaded once at start-up from environment variables (after `.env` is read)
//! and passed into state construction. Nothing reads the environment later.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be used.
    #[error("Invalid value for {var}: {value:?}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listener
    pub server: ServerConfig,
    /// Record store
    pub database: DatabaseConfig,
    /// Admin login
    pub auth: AuthConfig,
    /// Backup export
    pub backup: BackupConfig,
    /// Outbound email
    pub email: EmailConfig,
    /// File uploads
    pub uploads: UploadConfig,
    /// Prometheus listener port; no exporter when unset
    pub metrics_port: Option<u16>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

impl ServerConfig {
    /// `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL; start-up fails when unset
    pub url: Option<String>,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Admin authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Admin username
    pub admin_username: Option<String>,
    /// Admin password
    pub admin_password: Option<String>,
    /// Add `Secure` to the session cookie
    pub cookie_secure: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Backup configuration
#[derive(Clone)]
pub struct BackupConfig {
    /// Shared secret expected in `x-api-key`
    pub api_key: Option<String>,
    /// OAuth access token for the spreadsheet API
    pub sheets_access_token: Option<String>,
    /// Existing spreadsheet to append to
    pub spreadsheet_id: Option<String>,
    /// Spreadsheet API base URL
    pub sheets_api_url: String,
}

impl std::fmt::Debug for BackupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("sheets_access_token", &self.sheets_access_token.as_ref().map(|_| "<redacted>"))
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheets_api_url", &self.sheets_api_url)
            .finish()
    }
}

/// Which email provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProviderKind {
    /// HTTP API (Resend-compatible)
    Resend,
    /// SMTP relay
    Smtp,
    /// Log instead of sending
    Console,
}

impl std::str::FromStr for EmailProviderKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "resend" => Ok(Self::Resend),
            "smtp" => Ok(Self::Smtp),
            "console" => Ok(Self::Console),
            _ => Err(()),
        }
    }
}

/// Email configuration
#[derive(Clone)]
pub struct EmailConfig {
    /// Provider selection
    pub provider: EmailProviderKind,
    /// Resend API key
    pub resend_api_key: Option<String>,
    /// Resend API base URL
    pub resend_api_url: String,
    /// SMTP relay host
    pub smtp_host: Option<String>,
    /// SMTP port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: Option<String>,
    /// SMTP password
    pub smtp_password: Option<String>,
    /// Sender mailbox
    pub from: String,
    /// Fallback recipient for test emails
    pub admin_email: Option<String>,
    /// Email customers when their request changes status
    pub notify_on_status_change: bool,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("provider", &self.provider)
            .field("resend_api_url", &self.resend_api_url)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("from", &self.from)
            .field("admin_email", &self.admin_email)
            .field("notify_on_status_change", &self.notify_on_status_change)
            .finish_non_exhaustive()
    }
}

/// Upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploads are written to
    pub dir: PathBuf,
    /// Public path prefix uploads are served under
    pub public_prefix: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if a variable has an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` (used by tests).
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if a variable has an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            server: ServerConfig {
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse(&get, "PORT", 3000)?,
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL"),
                max_connections: parse(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            auth: AuthConfig {
                admin_username: get("ADMIN_USERNAME"),
                admin_password: get("ADMIN_PASSWORD"),
                cookie_secure: parse_bool(&get, "SESSION_COOKIE_SECURE", true)?,
            },
            backup: BackupConfig {
                api_key: get("BACKUP_API_KEY"),
                sheets_access_token: get("GOOGLE_SHEETS_ACCESS_TOKEN"),
                spreadsheet_id: get("GOOGLE_SHEETS_SPREADSHEET_ID"),
                sheets_api_url: get("GOOGLE_SHEETS_API_URL")
                    .unwrap_or_else(|| "https://sheets.googleapis.com".to_string()),
            },
            email: EmailConfig {
                provider: match get("EMAIL_PROVIDER") {
                    None => EmailProviderKind::Resend,
                    Some(value) => value.parse().map_err(|()| ConfigError::Invalid {
                        var: "EMAIL_PROVIDER",
                        value,
                    })?,
                },
                resend_api_key: get("RESEND_API_KEY"),
                resend_api_url: get("RESEND_API_URL")
                    .unwrap_or_else(|| "https://api.resend.com".to_string()),
                smtp_host: get("SMTP_HOST"),
                smtp_port: parse(&get, "SMTP_PORT", 587)?,
                smtp_username: get("SMTP_USERNAME"),
                smtp_password: get("SMTP_PASSWORD"),
                from: get("EMAIL_FROM")
                    .unwrap_or_else(|| "Pharmacy <noreply@example.com>".to_string()),
                admin_email: get("ADMIN_EMAIL"),
                notify_on_status_change: parse_bool(&get, "NOTIFY_ON_STATUS_CHANGE", false)?,
            },
            uploads: UploadConfig {
                dir: get("UPLOAD_DIR").map_or_else(|| PathBuf::from("public/uploads"), PathBuf::from),
                public_prefix: get("UPLOAD_PUBLIC_PREFIX").unwrap_or_else(|| "/uploads".to_string()),
            },
            metrics_port: get("METRICS_PORT")
                .map(|value| {
                    value.parse().map_err(|_| ConfigError::Invalid {
                        var: "METRICS_PORT",
                        value,
                    })
                })
                .transpose()?,
        })
    }
}

fn parse<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn parse_bool<G>(get: &G, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { var, value }),
        },
    }
}
