//! Notification Dispatcher.
//!
//! Sends transactional email through a configured provider. A missing
//! provider credential is a configuration error surfaced before any network
//! call. Delivery failures propagate to the caller unchanged: there is no
//! retry, no queue and no delivery-receipt tracking.

use crate::record::RequestRecord;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while sending email.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// No provider (or provider credential) is configured.
    #[error("Email provider not configured: {0}")]
    NotConfigured(String),

    /// No recipient was given and no admin address is configured.
    #[error("No recipient address available")]
    NoRecipient,

    /// A sender or recipient address could not be parsed.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Network failure or provider-side rejection.
    #[error("Email delivery failed: {0}")]
    Delivery(String),
}

/// A single HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

impl EmailMessage {
    /// Build a message.
    #[must_use]
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// Boxed future returned by [`EmailProvider::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;

/// Email provider.
///
/// This trait abstracts over delivery services (Resend, SMTP relays, a
/// console logger for development).
pub trait EmailProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network request fails
    /// - Email provider rejects the request
    /// - An address is malformed
    fn send<'a>(&'a self, message: &'a EmailMessage) -> SendFuture<'a>;
}

/// Sends emails through an optional provider.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    provider: Option<Arc<dyn EmailProvider>>,
    admin_email: Option<String>,
    notify_status_changes: bool,
}

impl NotificationDispatcher {
    /// Create a dispatcher.
    ///
    /// `provider` is `None` when no credential is configured; every send then
    /// fails with [`NotifyError::NotConfigured`].
    #[must_use]
    pub fn new(provider: Option<Arc<dyn EmailProvider>>, admin_email: Option<String>) -> Self {
        Self {
            provider,
            admin_email: admin_email.filter(|email| !email.trim().is_empty()),
            notify_status_changes: false,
        }
    }

    /// Enable customer emails on status changes.
    #[must_use]
    pub const fn with_status_notifications(mut self, enabled: bool) -> Self {
        self.notify_status_changes = enabled;
        self
    }

    /// Whether a provider is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Send one message.
    ///
    /// # Errors
    ///
    /// [`NotifyError::NotConfigured`] without a provider, otherwise whatever
    /// the provider returns.
    pub async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let Some(provider) = &self.provider else {
            metrics::counter!("pharmadesk_emails_total", "outcome" => "not_configured").increment(1);
            return Err(NotifyError::NotConfigured(
                "no email provider credential set".to_string(),
            ));
        };

        match provider.send(message).await {
            Ok(()) => {
                metrics::counter!("pharmadesk_emails_total", "outcome" => "sent").increment(1);
                tracing::info!(provider = provider.name(), to = %message.to, subject = %message.subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                metrics::counter!("pharmadesk_emails_total", "outcome" => "failed").increment(1);
                tracing::error!(provider = provider.name(), to = %message.to, error = %e, "Email delivery failed");
                Err(e)
            }
        }
    }

    /// Send the test email to `to`, or to the admin address when absent.
    ///
    /// # Errors
    ///
    /// [`NotifyError::NoRecipient`] when neither address is available, or
    /// any error from [`Self::send`].
    pub async fn send_test(&self, to: Option<&str>) -> Result<String, NotifyError> {
        let recipient = to
            .map(str::trim)
            .filter(|to| !to.is_empty())
            .or(self.admin_email.as_deref())
            .ok_or(NotifyError::NoRecipient)?
            .to_string();

        let message = EmailMessage::new(
            recipient.clone(),
            "Pharmacy test email",
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h2 style="color: #0f766e;">Email delivery is working</h2>
    <p>This is a test message from the pharmacy admin panel.</p>
</body>
</html>"#,
        );

        self.send(&message).await?;
        Ok(recipient)
    }

    /// Tell the customer their request changed status.
    ///
    /// Returns `Ok(false)` without sending when status notifications are off
    /// or the record has no contact email.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::send`].
    pub async fn status_changed(&self, record: &RequestRecord) -> Result<bool, NotifyError> {
        if !self.notify_status_changes {
            return Ok(false);
        }
        let Some(to) = record.contact_email() else {
            return Ok(false);
        };

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h2 style="color: #0f766e;">Your request has been updated</h2>
    <p>Request <strong>{id}</strong> is now <strong>{status}</strong>.</p>
</body>
</html>"#,
            id = record.id,
            status = record.status,
        );

        self.send(&EmailMessage::new(to, "Your pharmacy request status", html))
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_dispatcher_fails_before_sending() {
        let dispatcher = NotificationDispatcher::new(None, Some("admin@example.com".into()));
        assert!(!dispatcher.is_configured());

        let result = dispatcher.send_test(None).await;
        assert!(matches!(result, Err(NotifyError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn test_missing_recipient() {
        let dispatcher = NotificationDispatcher::new(None, Some("   ".into()));
        assert_eq!(dispatcher.send_test(Some("")).await, Err(NotifyError::NoRecipient));
    }
}
