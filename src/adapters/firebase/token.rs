//! Google OAuth2 token minting for service accounts.
//!
//! REST access to Firestore and the Identity Toolkit authenticates with a
//! bearer token obtained by exchanging a signed RS256 JWT assertion at the
//! Google token endpoint. Tokens are cached and refreshed shortly before
//! they expire.

use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Scopes covering Firestore documents and account management.
const SCOPES: &str =
    "https://www.googleapis.com/auth/datastore https://www.googleapis.com/auth/identitytoolkit";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Assertion lifetime requested from the token endpoint.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Service-account credentials used to sign token assertions.
#[derive(Clone)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: SecretString,
    pub private_key_id: Option<String>,
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Create a credential with the default Google token endpoint.
    pub fn new(
        project_id: impl Into<String>,
        client_email: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            client_email: client_email.into(),
            private_key: SecretString::new(private_key.into()),
            private_key_id: None,
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }

    /// Set the private key id included in the assertion header.
    pub fn with_private_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.private_key_id = Some(key_id.into());
        self
    }

    /// Set a custom token endpoint (for testing).
    pub fn with_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.token_uri = uri.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Cached access token with expiry tracking.
struct CachedToken {
    token: String,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() + EXPIRY_MARGIN >= self.ttl
    }
}

/// Mints and caches OAuth2 access tokens for a service account.
pub struct TokenProvider {
    key: ServiceAccountKey,
    http_client: reqwest::Client,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a new provider. No token is minted until first use.
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            http_client: reqwest::Client::new(),
            cache: RwLock::new(None),
        }
    }

    /// Get a valid access token, minting a new one if the cache is stale.
    pub async fn access_token(&self) -> Result<String, TokenError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(cached) = cache.as_ref() {
            if !cached.is_expired() {
                return Ok(cached.token.clone());
            }
        }

        let minted = self.mint().await?;
        let token = minted.access_token.clone();
        *cache = Some(CachedToken {
            token: minted.access_token,
            fetched_at: Instant::now(),
            ttl: Duration::from_secs(minted.expires_in),
        });

        Ok(token)
    }

    async fn mint(&self) -> Result<TokenResponse, TokenError> {
        let assertion = self.build_assertion()?;

        tracing::debug!(client_email = %self.key.client_email, "minting service account token");

        let response = self
            .http_client
            .post(&self.key.token_uri)
            .timeout(Duration::from_secs(10))
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "token endpoint request failed");
                TokenError::new(format!("Token endpoint request failed: {}", err))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "token endpoint returned failure");
            return Err(TokenError::new(format!(
                "Token endpoint returned {}",
                status
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|err| TokenError::new(format!("Invalid token response: {}", err)))
    }

    fn build_assertion(&self) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let encoding_key =
            EncodingKey::from_rsa_pem(self.key.private_key.expose_secret().as_bytes()).map_err(
                |err| TokenError::new(format!("Invalid service account private key: {}", err)),
            )?;

        encode(&header, &claims, &encoding_key)
            .map_err(|err| TokenError::new(format!("Failed to sign assertion: {}", err)))
    }
}

/// Failure to obtain an access token.
#[derive(Debug, Clone)]
pub struct TokenError {
    pub message: String,
}

impl TokenError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TokenError {}
