//! Payment gateway configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment gateway configuration (Midtrans)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MidtransConfig {
    /// Midtrans server key (`Mid-server-...` or `SB-Mid-server-...`)
    pub server_key: String,

    /// Override the Snap API base URL
    pub snap_base_url: Option<String>,

    /// Override the core API base URL
    pub api_base_url: Option<String>,
}

impl MidtransConfig {
    /// Check if using a sandbox server key
    pub fn is_sandbox(&self) -> bool {
        self.server_key.starts_with("SB-")
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.server_key.is_empty() {
            return Err(ValidationError::MissingRequired("MIDTRANS__SERVER_KEY"));
        }

        // Verify key prefix for safety
        if !self.server_key.starts_with("Mid-server-")
            && !self.server_key.starts_with("SB-Mid-server-")
        {
            return Err(ValidationError::InvalidMidtransServerKey);
        }

        Ok(())
    }
}
