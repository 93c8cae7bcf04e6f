//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid MailerSend API key format")]
    InvalidMailerSendKey,

    #[error("Invalid Midtrans server key format")]
    InvalidMidtransServerKey,

    #[error("Service account private key is not a PEM-encoded key")]
    InvalidServiceAccountKey,

    #[error("Invalid service account client email")]
    InvalidClientEmail,
}
