//! Firebase Auth (Identity Toolkit) adapter.
//!
//! Implements [`IdentityProvider`] with `accounts:lookup` and
//! `accounts:update` on the Identity Toolkit v1 API, authorized with the
//! service-account bearer token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::ports::{IdentityError, IdentityErrorCode, IdentityProvider, IdentityUser};

use super::token::TokenProvider;

const IDENTITY_BASE: &str = "https://identitytoolkit.googleapis.com/v1";
const IO_TIMEOUT: Duration = Duration::from_secs(10);

/// Firebase Auth account management client.
pub struct FirebaseAuthClient {
    tokens: Arc<TokenProvider>,
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

impl FirebaseAuthClient {
    /// Create a client sharing the given token provider.
    pub fn new(tokens: Arc<TokenProvider>) -> Self {
        Self {
            tokens,
            http_client: reqwest::Client::new(),
            base_url: IDENTITY_BASE.to_string(),
        }
    }

    /// Set a custom Identity Toolkit base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn bearer(&self) -> Result<String, IdentityError> {
        self.tokens.access_token().await.map_err(|err| {
            IdentityError::new(IdentityErrorCode::Network, err.message)
        })
    }

    /// Map an Identity Toolkit error message onto our categories.
    fn classify(status: reqwest::StatusCode, provider_message: &str) -> IdentityError {
        let code = match provider_message {
            m if m.starts_with("EMAIL_NOT_FOUND") || m.starts_with("USER_NOT_FOUND") => {
                IdentityErrorCode::UserNotFound
            }
            m if m.starts_with("INVALID_EMAIL") => IdentityErrorCode::InvalidEmail,
            m if m.starts_with("WEAK_PASSWORD") => IdentityErrorCode::WeakPassword,
            _ => IdentityErrorCode::Provider,
        };

        IdentityError::new(
            code,
            format!("Identity provider returned {}: {}", status, provider_message),
        )
    }

    async fn provider_error(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_default();

        tracing::error!(status = %status, provider_message = %message, "identity provider call failed");
        Self::classify(status, &message)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    async fn find_user_by_email(&self, email: &str) -> Result<IdentityUser, IdentityError> {
        let token = self.bearer().await?;
        let url = format!("{}/accounts:lookup", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .timeout(IO_TIMEOUT)
            .json(&json!({ "email": [email] }))
            .send()
            .await
            .map_err(|err| {
                IdentityError::new(
                    IdentityErrorCode::Network,
                    format!("Account lookup failed: {}", err),
                )
            })?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        let lookup: LookupResponse = response.json().await.map_err(|err| {
            IdentityError::new(
                IdentityErrorCode::Provider,
                format!("Invalid lookup response: {}", err),
            )
        })?;

        // A successful lookup with no matching account comes back with an
        // empty users list, not an error status.
        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or_else(|| IdentityError::user_not_found(email))?;

        Ok(IdentityUser {
            uid: user.local_id,
            email: user.email.unwrap_or_else(|| email.to_string()),
        })
    }

    async fn set_password(&self, uid: &str, new_password: &str) -> Result<(), IdentityError> {
        let token = self.bearer().await?;
        let url = format!("{}/accounts:update", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .timeout(IO_TIMEOUT)
            .json(&json!({ "localId": uid, "password": new_password }))
            .send()
            .await
            .map_err(|err| {
                IdentityError::new(
                    IdentityErrorCode::Network,
                    format!("Account update failed: {}", err),
                )
            })?;

        if !response.status().is_success() {
            return Err(Self::provider_error(response).await);
        }

        tracing::info!(uid, "password updated at identity provider");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_provider_messages() {
        let err = FirebaseAuthClient::classify(
            reqwest::StatusCode::BAD_REQUEST,
            "EMAIL_NOT_FOUND",
        );
        assert_eq!(err.code, IdentityErrorCode::UserNotFound);

        let err = FirebaseAuthClient::classify(
            reqwest::StatusCode::BAD_REQUEST,
            "WEAK_PASSWORD : Password should be at least 6 characters",
        );
        assert_eq!(err.code, IdentityErrorCode::WeakPassword);

        let err = FirebaseAuthClient::classify(
            reqwest::StatusCode::BAD_REQUEST,
            "INVALID_EMAIL",
        );
        assert_eq!(err.code, IdentityErrorCode::InvalidEmail);

        let err =
            FirebaseAuthClient::classify(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.code, IdentityErrorCode::Provider);
    }

    #[test]
    fn lookup_response_tolerates_missing_users() {
        let parsed: LookupResponse = serde_json::from_str("{\"kind\":\"x\"}").unwrap();
        assert!(parsed.users.is_empty());
    }
}
