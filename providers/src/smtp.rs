//! SMTP email provider implementation using Lettre.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use pharmadesk_core::notify::SendFuture;
use pharmadesk_core::{EmailMessage, EmailProvider, NotifyError};

/// SMTP email provider using Lettre.
///
/// # Examples
///
/// ```ignore
/// use pharmadesk_providers::SmtpEmailProvider;
///
/// let provider = SmtpEmailProvider::new(
///     "smtp.example.com",
///     587,
///     "user",
///     "app_password",
///     "Pharmacy <noreply@example.com>",
/// )?;
/// ```
#[derive(Clone)]
pub struct SmtpEmailProvider {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from: Mailbox,
}

impl SmtpEmailProvider {
    /// Create a new SMTP email provider.
    ///
    /// # Errors
    ///
    /// [`NotifyError::InvalidAddress`] if `from` is not a valid mailbox.
    pub fn new(
        smtp_server: impl Into<String>,
        smtp_port: u16,
        smtp_username: impl Into<String>,
        smtp_password: impl Into<String>,
        from: &str,
    ) -> Result<Self, NotifyError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::InvalidAddress(format!("from address {from}: {e}")))?;

        Ok(Self {
            smtp_server: smtp_server.into(),
            smtp_port,
            credentials: Credentials::new(smtp_username.into(), smtp_password.into()),
            from,
        })
    }

    /// Build SMTP transport for sending emails.
    ///
    /// Creates a new transport for each email to avoid connection pooling issues.
    fn build_transport(&self) -> Result<SmtpTransport, NotifyError> {
        Ok(SmtpTransport::starttls_relay(&self.smtp_server)
            .map_err(|e| NotifyError::Delivery(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, NotifyError> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::InvalidAddress(format!("{}: {e}", message.to)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| NotifyError::Delivery(format!("Failed to build email: {e}")))
    }

    async fn deliver(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let email = self.build_message(message)?;
        let mailer = self.build_transport()?;

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| NotifyError::Delivery(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| NotifyError::Delivery(format!("Email task failed: {e}")))?
        .map(|_| ())
    }
}

impl std::fmt::Debug for SmtpEmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpEmailProvider")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl EmailProvider for SmtpEmailProvider {
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn send<'a>(&'a self, message: &'a EmailMessage) -> SendFuture<'a> {
        Box::pin(self.deliver(message))
    }
}
