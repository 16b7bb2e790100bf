//! Console email provider for development.

use pharmadesk_core::notify::SendFuture;
use pharmadesk_core::{EmailMessage, EmailProvider};
use tracing::info;

/// Logs emails instead of sending them.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailProvider;

impl ConsoleEmailProvider {
    /// Create a new console email provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EmailProvider for ConsoleEmailProvider {
    fn name(&self) -> &'static str {
        "console"
    }

    fn send<'a>(&'a self, message: &'a EmailMessage) -> SendFuture<'a> {
        Box::pin(async move {
            info!(
                to = %message.to,
                subject = %message.subject,
                bytes = message.html.len(),
                "Email (development mode, not sent)"
            );
            println!("\n--- EMAIL ------------------------------------------------------");
            println!("To:      {}", message.to);
            println!("Subject: {}", message.subject);
            println!("----------------------------------------------------------------");
            println!("{}", message.html);
            println!("----------------------------------------------------------------\n");
            Ok(())
        })
    }
}
