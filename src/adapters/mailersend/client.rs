//! MailerSend API client.
//!
//! Implements [`EmailSender`] against the MailerSend `POST /v1/email`
//! endpoint using bearer authentication. One attempt per send, 30 second
//! timeout, no retry.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::ports::{EmailError, EmailMessage, EmailSender};

/// Timeout for a send call.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// MailerSend API configuration.
#[derive(Clone)]
pub struct MailerSendConfig {
    /// MailerSend API token.
    api_key: SecretString,

    /// Base URL for the MailerSend API.
    api_base_url: String,
}

impl MailerSendConfig {
    /// Create a new MailerSend configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.mailersend.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Wire format for the send-email call.
#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: Party<'a>,
    to: [Party<'a>; 1],
    subject: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct Party<'a> {
    email: &'a str,
}

impl<'a> SendEmailBody<'a> {
    fn from_message(message: &'a EmailMessage) -> Self {
        Self {
            from: Party {
                email: &message.from,
            },
            to: [Party { email: &message.to }],
            subject: &message.subject,
            text: message.text.as_deref(),
            html: message.html.as_deref(),
        }
    }
}

/// MailerSend email client.
pub struct MailerSendClient {
    config: MailerSendConfig,
    http_client: reqwest::Client,
}

impl MailerSendClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MailerSendConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailSender for MailerSendClient {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let url = format!("{}/v1/email", self.config.api_base_url);
        let body = SendEmailBody::from_message(&message);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .timeout(SEND_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "email send request failed");
                EmailError::new(format!("Email provider request failed: {}", err))
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(recipient = %message.to, "email accepted by provider");
            return Ok(());
        }

        let provider_response = response.json::<serde_json::Value>().await.ok();
        tracing::error!(
            status = %status,
            provider_response = ?provider_response,
            "email provider rejected send"
        );

        let mut err = EmailError::new(format!("Email provider returned {}", status));
        if let Some(body) = provider_response {
            err = err.with_provider_response(body);
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            from: "noreply@example.com".to_string(),
            to: "user@example.com".to_string(),
            subject: "Your OTP".to_string(),
            text: Some("123456".to_string()),
            html: None,
        }
    }

    #[test]
    fn body_shapes_addresses_the_provider_way() {
        let msg = message();
        let body = SendEmailBody::from_message(&msg);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["from"]["email"], "noreply@example.com");
        assert_eq!(json["to"][0]["email"], "user@example.com");
        assert_eq!(json["subject"], "Your OTP");
        assert_eq!(json["text"], "123456");
        assert!(json.get("html").is_none());
    }

    #[test]
    fn body_omits_absent_text() {
        let msg = EmailMessage {
            text: None,
            html: Some("<b>123456</b>".to_string()),
            ..message()
        };
        let json = serde_json::to_value(SendEmailBody::from_message(&msg)).unwrap();

        assert!(json.get("text").is_none());
        assert_eq!(json["html"], "<b>123456</b>");
    }

    #[test]
    fn config_base_url_override() {
        let config = MailerSendConfig::new("mlsn.key").with_base_url("http://localhost:9999");
        assert_eq!(config.api_base_url, "http://localhost:9999");
    }
}
