//! HTTP transactional-email provider.

use pharmadesk_core::notify::SendFuture;
use pharmadesk_core::{EmailMessage, EmailProvider, NotifyError};
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.resend.com";

/// Request body for `POST /emails`.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Resend-compatible email API client.
#[derive(Clone)]
pub struct ResendEmailProvider {
    client: Client,
    api_key: String,
    api_url: String,
    from: String,
}

impl ResendEmailProvider {
    /// Create a provider against the public API.
    ///
    /// # Errors
    ///
    /// [`NotifyError::NotConfigured`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Result<Self, NotifyError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(NotifyError::NotConfigured(
                "RESEND_API_KEY is empty".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            from: from.into(),
        })
    }

    /// Point the provider at a different base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let body = SendEmailRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(format!("Request failed: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(NotifyError::NotConfigured(
                "email provider rejected the API key".to_string(),
            )),
            StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                Err(NotifyError::InvalidAddress(body))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(NotifyError::Delivery(format!(
                    "provider returned {}: {body}",
                    status.as_u16()
                )))
            }
        }
    }
}

impl std::fmt::Debug for ResendEmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendEmailProvider")
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl EmailProvider for ResendEmailProvider {
    fn name(&self) -> &'static str {
        "resend"
    }

    fn send<'a>(&'a self, message: &'a EmailMessage) -> SendFuture<'a> {
        Box::pin(self.post(message))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_not_configured() {
        assert!(matches!(
            ResendEmailProvider::new("  ", "a@b.test"),
            Err(NotifyError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_api_url_trailing_slash_is_trimmed() {
        let provider = ResendEmailProvider::new("key", "a@b.test")
            .unwrap()
            .with_api_url("http://localhost:9000/");
        assert_eq!(provider.api_url, "http://localhost:9000");
        assert!(!format!("{provider:?}").contains("key"));
    }
}
