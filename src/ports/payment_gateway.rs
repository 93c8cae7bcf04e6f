//! Payment gateway port.
//!
//! Two operations back the proxy's payment endpoints: creating a hosted
//! checkout session token and polling the live status of a transaction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Customer details attached to a checkout session.
///
/// All optional; the gateway adapter substitutes defaults for absent
/// fields before submitting the transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A purchased line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDetail {
    pub id: String,
    pub price: u64,
    pub quantity: u32,
    pub name: String,
}

/// Request for a hosted-checkout session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapRequest {
    /// Order identifier, assigned by the frontend.
    pub order_id: String,

    /// Total amount in the smallest currency unit.
    pub gross_amount: u64,

    pub customer: CustomerDetails,
    pub items: Vec<ItemDetail>,
}

/// Opaque credential used by the frontend to open the hosted checkout page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapToken {
    pub token: String,
    pub redirect_url: Option<String>,
}

/// Live transaction state as reported by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionStatusResponse {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Port for the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout session and return its token.
    async fn create_snap_token(&self, request: SnapRequest) -> Result<SnapToken, GatewayError>;

    /// Fetch the live status of a transaction by order id.
    async fn transaction_status(
        &self,
        order_id: &str,
    ) -> Result<TransactionStatusResponse, GatewayError>;
}

/// Errors from gateway operations.
#[derive(Debug, Clone)]
pub struct GatewayError {
    /// Error category.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider error payload, when one was returned.
    pub provider_response: Option<serde_json::Value>,
}

/// Gateway error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorCode {
    /// The gateway has no transaction for the order id.
    OrderNotFound,

    /// The gateway answered with a failure status.
    Provider,

    /// Transport failure or timeout before an answer arrived.
    Network,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_response: None,
        }
    }

    /// Create an order-not-found error.
    pub fn order_not_found(order_id: &str) -> Self {
        Self::new(
            GatewayErrorCode::OrderNotFound,
            format!("Order {} not found at gateway", order_id),
        )
    }

    /// Create a provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Provider, message)
    }

    /// Create a network/transport error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Network, message)
    }

    /// Attach the provider's error payload.
    pub fn with_provider_response(mut self, body: serde_json::Value) -> Self {
        self.provider_response = Some(body);
        self
    }

    /// Check whether this is an order-not-found error.
    pub fn is_not_found(&self) -> bool {
        self.code == GatewayErrorCode::OrderNotFound
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for GatewayError {}
