//! Email configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Email configuration (MailerSend)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailConfig {
    /// MailerSend API token
    pub api_key: String,

    /// Override the MailerSend API base URL
    pub api_base_url: Option<String>,
}

impl EmailConfig {
    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("EMAIL__API_KEY"));
        }
        if !self.api_key.starts_with("mlsn.") {
            return Err(ValidationError::InvalidMailerSendKey);
        }
        Ok(())
    }
}
