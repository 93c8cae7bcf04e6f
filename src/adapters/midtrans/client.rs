//! Midtrans API client.
//!
//! Implements [`PaymentGateway`] with two calls: Snap token creation against
//! the Snap API and live status lookup against the core API. Both
//! authenticate with HTTP Basic auth where the username is the server key
//! and the password is empty, i.e. `base64(server_key + ":")`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::ports::{
    GatewayError, PaymentGateway, SnapRequest, SnapToken, TransactionStatusResponse,
};

/// Timeout for Snap token creation.
const SNAP_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for status polling.
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Midtrans API configuration.
#[derive(Clone)]
pub struct MidtransClientConfig {
    /// Server key (`Mid-server-...` or `SB-Mid-server-...`).
    server_key: SecretString,

    /// Base URL for the Snap API.
    snap_base_url: String,

    /// Base URL for the core (status) API.
    api_base_url: String,
}

impl MidtransClientConfig {
    /// Create a configuration for the given server key.
    ///
    /// Sandbox keys (`SB-...`) target the sandbox hosts, any other key
    /// targets production.
    pub fn new(server_key: impl Into<String>) -> Self {
        let key = server_key.into();
        let (snap, api) = if key.starts_with("SB-") {
            (
                "https://app.sandbox.midtrans.com",
                "https://api.sandbox.midtrans.com",
            )
        } else {
            ("https://app.midtrans.com", "https://api.midtrans.com")
        };

        Self {
            server_key: SecretString::new(key),
            snap_base_url: snap.to_string(),
            api_base_url: api.to_string(),
        }
    }

    /// Set a custom Snap base URL (for testing).
    pub fn with_snap_base_url(mut self, url: impl Into<String>) -> Self {
        self.snap_base_url = url.into();
        self
    }

    /// Set a custom core API base URL (for testing).
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire Types
// ════════════════════════════════════════════════════════════════════════════════

/// Snap transaction payload, as the Snap API expects it.
#[derive(Debug, Serialize)]
struct SnapTransactionBody {
    transaction_details: TransactionDetails,
    customer_details: SnapCustomer,
    item_details: Vec<SnapItem>,
    credit_card: CreditCard,
}

#[derive(Debug, Serialize)]
struct TransactionDetails {
    order_id: String,
    gross_amount: u64,
}

#[derive(Debug, Serialize)]
struct SnapCustomer {
    first_name: String,
    email: String,
    phone: String,
}

#[derive(Debug, Serialize)]
struct SnapItem {
    id: String,
    price: u64,
    quantity: u32,
    name: String,
}

#[derive(Debug, Serialize)]
struct CreditCard {
    secure: bool,
}

#[derive(Debug, Deserialize)]
struct SnapTokenBody {
    token: String,
    #[serde(default)]
    redirect_url: Option<String>,
}

/// Build the Snap payload, substituting the documented customer defaults.
fn build_snap_body(request: &SnapRequest) -> SnapTransactionBody {
    SnapTransactionBody {
        transaction_details: TransactionDetails {
            order_id: request.order_id.clone(),
            gross_amount: request.gross_amount,
        },
        customer_details: SnapCustomer {
            first_name: request
                .customer
                .first_name
                .clone()
                .unwrap_or_else(|| "Customer".to_string()),
            email: request.customer.email.clone().unwrap_or_default(),
            phone: request.customer.phone.clone().unwrap_or_default(),
        },
        item_details: request
            .items
            .iter()
            .map(|item| SnapItem {
                id: item.id.clone(),
                price: item.price,
                quantity: item.quantity,
                name: item.name.clone(),
            })
            .collect(),
        credit_card: CreditCard { secure: true },
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Client
// ════════════════════════════════════════════════════════════════════════════════

/// Midtrans gateway client.
pub struct MidtransClient {
    config: MidtransClientConfig,
    http_client: reqwest::Client,
}

impl MidtransClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MidtransClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn transport_error(err: reqwest::Error, what: &str) -> GatewayError {
        if err.is_timeout() {
            GatewayError::network(format!("{} timed out", what))
        } else {
            GatewayError::network(format!("{} failed: {}", what, err))
        }
    }
}

#[async_trait]
impl PaymentGateway for MidtransClient {
    async fn create_snap_token(&self, request: SnapRequest) -> Result<SnapToken, GatewayError> {
        let url = format!("{}/snap/v1/transactions", self.config.snap_base_url);
        let body = build_snap_body(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.server_key.expose_secret(), Some(""))
            .timeout(SNAP_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(order_id = %request.order_id, error = %err, "snap token request failed");
                Self::transport_error(err, "Snap token request")
            })?;

        let status = response.status();
        if !status.is_success() {
            let provider_response = response.json::<serde_json::Value>().await.ok();
            tracing::error!(
                order_id = %request.order_id,
                status = %status,
                provider_response = ?provider_response,
                "gateway rejected snap transaction"
            );

            let mut err = GatewayError::provider(format!("Gateway returned {}", status));
            if let Some(body) = provider_response {
                err = err.with_provider_response(body);
            }
            return Err(err);
        }

        let token: SnapTokenBody = response.json().await.map_err(|err| {
            GatewayError::provider(format!("Invalid snap token response: {}", err))
        })?;

        tracing::info!(order_id = %request.order_id, "snap token generated");

        Ok(SnapToken {
            token: token.token,
            redirect_url: token.redirect_url,
        })
    }

    async fn transaction_status(
        &self,
        order_id: &str,
    ) -> Result<TransactionStatusResponse, GatewayError> {
        let url = format!("{}/v2/{}/status", self.config.api_base_url, order_id);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.server_key.expose_secret(), Some(""))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(order_id, error = %err, "status request failed");
                Self::transport_error(err, "Status request")
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::order_not_found(order_id));
        }
        if !status.is_success() {
            let provider_response = response.json::<serde_json::Value>().await.ok();
            tracing::error!(
                order_id,
                status = %status,
                provider_response = ?provider_response,
                "gateway status lookup failed"
            );

            let mut err = GatewayError::provider(format!("Gateway returned {}", status));
            if let Some(body) = provider_response {
                err = err.with_provider_response(body);
            }
            return Err(err);
        }

        response.json::<TransactionStatusResponse>().await.map_err(|err| {
            GatewayError::provider(format!("Invalid status response: {}", err))
        })
    }
}
