//! Email sender port for the transactional email provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A transactional email to forward to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Sender address.
    pub from: String,

    /// Recipient address.
    pub to: String,

    /// Subject line.
    pub subject: String,

    /// Plain-text body.
    pub text: Option<String>,

    /// HTML body.
    pub html: Option<String>,
}

/// Port for the transactional email provider.
///
/// One attempt per call; the proxy never retries a send.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Forward a message to the provider.
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Error from the email provider.
#[derive(Debug, Clone)]
pub struct EmailError {
    /// Human-readable message.
    pub message: String,

    /// Provider error payload, when one was returned.
    pub provider_response: Option<serde_json::Value>,
}

impl EmailError {
    /// Create a new email error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            provider_response: None,
        }
    }

    /// Attach the provider's error payload.
    pub fn with_provider_response(mut self, body: serde_json::Value) -> Self {
        self.provider_response = Some(body);
        self
    }
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EmailError {}
