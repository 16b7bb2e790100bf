//! Production wiring of collaborators from configuration.

use crate::config::{Config, EmailConfig, EmailProviderKind};
use crate::state::Collaborators;
use pharmadesk_core::{EmailProvider, NotifyError, RecordStore, StoreError, SystemClock};
use pharmadesk_postgres::PostgresRecordStore;
use pharmadesk_providers::{
    ConsoleEmailProvider, GoogleSheetsSink, ResendEmailProvider, SmtpEmailProvider,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Start-up failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// `DATABASE_URL` is not set.
    #[error("DATABASE_URL is required")]
    MissingDatabase,

    /// The record store could not be reached or migrated.
    #[error("Record store unavailable: {0}")]
    Store(#[from] StoreError),

    /// The email provider configuration is unusable.
    #[error("Email provider misconfigured: {0}")]
    Email(#[from] NotifyError),
}

/// Build the record store, backup sink and email provider.
///
/// # Errors
///
/// [`BootstrapError`] if no database is configured, it cannot be reached or
/// migrated, or the sender address is invalid.
pub async fn collaborators(config: &Config) -> Result<Collaborators, BootstrapError> {
    let url = config
        .database
        .url
        .as_deref()
        .ok_or(BootstrapError::MissingDatabase)?;

    info!("Connecting to record store database...");
    let store = PostgresRecordStore::connect(url, config.database.max_connections).await?;
    store.migrate().await?;
    info!("Record store ready");
    let store: Arc<dyn RecordStore> = Arc::new(store);

    if config.backup.sheets_access_token.is_none() {
        warn!("GOOGLE_SHEETS_ACCESS_TOKEN not set; backups will fail until it is configured");
    }
    let sink = GoogleSheetsSink::new(config.backup.sheets_access_token.clone())
        .with_api_url(config.backup.sheets_api_url.clone())
        .with_spreadsheet_id(config.backup.spreadsheet_id.clone());

    Ok(Collaborators {
        store,
        sink: Arc::new(sink),
        email: email_provider(&config.email)?,
        clock: Arc::new(SystemClock),
    })
}

/// Email provider for `config`, or `None` when its credential is missing.
///
/// # Errors
///
/// [`NotifyError::InvalidAddress`] if the SMTP sender address is invalid.
pub fn email_provider(config: &EmailConfig) -> Result<Option<Arc<dyn EmailProvider>>, NotifyError> {
    let provider: Arc<dyn EmailProvider> = match config.provider {
        EmailProviderKind::Resend => {
            let Some(api_key) = &config.resend_api_key else {
                warn!("RESEND_API_KEY not set; email endpoints will report a configuration error");
                return Ok(None);
            };
            Arc::new(
                ResendEmailProvider::new(api_key.clone(), config.from.clone())?
                    .with_api_url(config.resend_api_url.clone()),
            )
        }
        EmailProviderKind::Smtp => {
            let Some(host) = &config.smtp_host else {
                warn!("SMTP_HOST not set; email endpoints will report a configuration error");
                return Ok(None);
            };
            Arc::new(SmtpEmailProvider::new(
                host.clone(),
                config.smtp_port,
                config.smtp_username.clone().unwrap_or_default(),
                config.smtp_password.clone().unwrap_or_default(),
                &config.from,
            )?)
        }
        EmailProviderKind::Console => Arc::new(ConsoleEmailProvider::new()),
    };

    info!(provider = provider.name(), "Email provider configured");
    Ok(Some(provider))
}
