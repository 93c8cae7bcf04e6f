//! HTTP handlers for the proxy endpoints.
//!
//! Each handler follows the same shape: validate required fields, invoke at
//! most one external call and one record update through the ports, and
//! return the JSON envelope. Nothing here talks to a concrete SDK.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use chrono::{SecondsFormat, Utc};
use secrecy::SecretString;
use serde_json::json;

use crate::application::handlers::{
    ApplyTransactionStatusCommand, ApplyTransactionStatusHandler,
};
use crate::domain::payment::{verify_signature, TransactionEnrichment};
use crate::ports::{
    CustomerDetails, EmailMessage, EmailSender, IdentityProvider, ItemDetail, PaymentGateway,
    PaymentRecordStore, SnapRequest,
};

use super::dto::{
    GenerateSnapTokenRequest, HealthResponse, PaymentFinishQuery, PaymentFinishResponse,
    PaymentStatusRequest, PaymentStatusResponse, ResetPasswordRequest, ResetPasswordResponse,
    SendOtpRequest, SendOtpResponse, ServiceInfoResponse, SnapTokenResponse, WebhookRequest,
    WebhookResponse,
};
use super::error::ApiError;

/// Endpoint catalogue, served from `/` and the 404 fallback.
pub const ENDPOINTS: [&str; 9] = [
    "GET /",
    "GET /health",
    "POST /send-otp",
    "POST /reset-password",
    "POST /generate-snap-token",
    "POST /midtrans-webhook",
    "GET /payment-finish",
    "GET /payment-status/:orderId",
    "POST /payment-status",
];

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state.
///
/// Immutable after startup: per-integration capability interfaces, present
/// only when that integration is configured, plus the gateway server key
/// used for webhook signature verification. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub email_sender: Option<Arc<dyn EmailSender>>,
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    pub record_store: Option<Arc<dyn PaymentRecordStore>>,
    pub identity: Option<Arc<dyn IdentityProvider>>,

    /// Gateway server key; signs webhook notifications.
    pub gateway_server_key: Option<SecretString>,
}

impl AppState {
    /// State with every integration disabled.
    pub fn disabled() -> Self {
        Self {
            email_sender: None,
            gateway: None,
            record_store: None,
            identity: None,
            gateway_server_key: None,
        }
    }

    pub fn email_config_ok(&self) -> bool {
        self.email_sender.is_some()
    }

    pub fn midtrans_config_ok(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn firebase_enabled(&self) -> bool {
        self.record_store.is_some()
    }

    fn reconciler(&self) -> ApplyTransactionStatusHandler {
        ApplyTransactionStatusHandler::new(self.record_store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Validation Helpers
// ════════════════════════════════════════════════════════════════════════════════

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

/// Collect required fields that are missing or blank into one 400.
fn require_fields(fields: &[(&'static str, Option<&str>)]) -> Result<(), ApiError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| is_blank(*value))
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::MissingFields(missing))
    }
}

/// Minimal email shape check: `local@domain.tld`, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .split_once('.')
        .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty())
}

// ════════════════════════════════════════════════════════════════════════════════
// Info Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET / - Service info
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        message: "Payment Backend Server",
        status: "RUNNING",
        firebase_enabled: state.firebase_enabled(),
        email_config_ok: state.email_config_ok(),
        midtrans_config_ok: state.midtrans_config_ok(),
        note: "Payment records are created by frontend, backend only updates status",
        endpoints: ENDPOINTS.to_vec(),
    })
}

/// GET /health - Health check
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        firebase_enabled: state.firebase_enabled(),
        email_config_ok: state.email_config_ok(),
        midtrans_config_ok: state.midtrans_config_ok(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// 404 fallback listing the available endpoints.
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "path": uri.path(),
            "method": method.as_str(),
            "available_endpoints": ENDPOINTS,
        })),
    )
}

// ════════════════════════════════════════════════════════════════════════════════
// Email
// ════════════════════════════════════════════════════════════════════════════════

/// POST /send-otp - Forward a transactional email to the provider
pub async fn send_otp(
    State(state): State<AppState>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, ApiError> {
    require_fields(&[
        ("from", request.from.as_deref()),
        ("to", request.to.as_deref()),
        ("subject", request.subject.as_deref()),
    ])?;

    if is_blank(request.text.as_deref()) && is_blank(request.html.as_deref()) {
        return Err(ApiError::Validation(
            "Either text or html content is required".to_string(),
        ));
    }

    let sender = state.email_sender.as_ref().ok_or(ApiError::NotConfigured(
        "Email service not configured - missing MAILERSEND_API_KEY",
    ))?;

    let to = request.to.unwrap_or_default();
    let message = EmailMessage {
        from: request.from.unwrap_or_default(),
        to: to.clone(),
        subject: request.subject.unwrap_or_default(),
        text: request.text,
        html: request.html,
    };

    sender.send(message).await.map_err(ApiError::Email)?;

    Ok(Json(SendOtpResponse {
        success: true,
        message: "OTP email sent successfully",
        recipient: to,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Accounts
// ════════════════════════════════════════════════════════════════════════════════

/// POST /reset-password - Replace a user's password at the identity provider
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    require_fields(&[
        ("email", request.email.as_deref()),
        ("newPassword", request.new_password.as_deref()),
    ])?;

    let email = request.email.unwrap_or_default();
    let new_password = request.new_password.unwrap_or_default();

    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }
    if new_password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    let identity = state
        .identity
        .as_ref()
        .ok_or(ApiError::NotConfigured("Firebase not configured"))?;

    let user = identity
        .find_user_by_email(&email)
        .await
        .map_err(ApiError::Identity)?;

    identity
        .set_password(&user.uid, &new_password)
        .await
        .map_err(ApiError::Identity)?;

    Ok(Json(ResetPasswordResponse {
        success: true,
        message: "Password updated successfully",
        email,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Payments
// ════════════════════════════════════════════════════════════════════════════════

/// POST /generate-snap-token - Create a hosted checkout session
pub async fn generate_snap_token(
    State(state): State<AppState>,
    Json(request): Json<GenerateSnapTokenRequest>,
) -> Result<Json<SnapTokenResponse>, ApiError> {
    let mut missing = Vec::new();
    if is_blank(request.order_id.as_deref()) {
        missing.push("order_id");
    }
    if request.gross_amount.is_none() {
        missing.push("gross_amount");
    }
    if request.customer_details.is_none() {
        missing.push("customer_details");
    }
    if request.item_details.is_none() {
        missing.push("item_details");
    }
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let gateway = state.gateway.as_ref().ok_or(ApiError::NotConfigured(
        "Midtrans not configured - missing MIDTRANS_SERVER_KEY",
    ))?;

    let order_id = request.order_id.unwrap_or_default();
    let customer = request.customer_details.map(|c| CustomerDetails {
        first_name: c.first_name,
        email: c.email,
        phone: c.phone,
    });
    let items = request
        .item_details
        .unwrap_or_default()
        .into_iter()
        .map(|item| ItemDetail {
            id: item.id,
            price: item.price,
            quantity: item.quantity,
            name: item.name,
        })
        .collect();

    let token = gateway
        .create_snap_token(SnapRequest {
            order_id: order_id.clone(),
            gross_amount: request.gross_amount.unwrap_or_default(),
            customer: customer.unwrap_or_default(),
            items,
        })
        .await
        .map_err(|source| ApiError::Gateway {
            context: "Failed to generate payment token",
            order_id: None,
            source,
        })?;

    Ok(Json(SnapTokenResponse {
        success: true,
        snap_token: token.token,
        order_id,
        message: "Payment token generated successfully",
    }))
}

/// POST /midtrans-webhook - Receive a gateway status notification
pub async fn midtrans_webhook(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> Result<Json<WebhookResponse>, ApiError> {
    require_fields(&[
        ("order_id", request.order_id.as_deref()),
        ("signature_key", request.signature_key.as_deref()),
        ("transaction_status", request.transaction_status.as_deref()),
    ])?;

    let server_key = state
        .gateway_server_key
        .as_ref()
        .ok_or(ApiError::NotConfigured("Midtrans not configured"))?;

    let order_id = request.order_id.unwrap_or_default();
    let signature_key = request.signature_key.unwrap_or_default();

    // The signature is the only thing standing between this endpoint and a
    // forged status update; reject before touching the store.
    if !verify_signature(
        &order_id,
        request.status_code.as_deref(),
        request.gross_amount.as_deref(),
        &signature_key,
        server_key,
    ) {
        tracing::warn!(order_id = %order_id, "webhook signature mismatch");
        return Err(ApiError::Validation("Invalid signature".to_string()));
    }

    let enrichment = TransactionEnrichment {
        payment_type: request.payment_type,
        transaction_time: request.transaction_time,
        gross_amount: request.gross_amount,
        fraud_status: request.fraud_status,
        currency: request.currency,
    };

    let (info, record_update) = state
        .reconciler()
        .handle(ApplyTransactionStatusCommand {
            order_id: order_id.clone(),
            transaction_status: request.transaction_status,
            enrichment: Some(enrichment),
        })
        .await;

    Ok(Json(WebhookResponse {
        success: true,
        message: "Webhook processed successfully",
        order_id,
        status: info.status,
        is_paid: info.is_paid,
        record_update,
    }))
}

/// GET /payment-finish - User-facing redirect after checkout
///
/// No signature check: this is a browser redirect, not a trusted webhook.
/// The stored record still only moves through the same reconciliation path.
pub async fn payment_finish(
    State(state): State<AppState>,
    Query(query): Query<PaymentFinishQuery>,
) -> Result<Json<PaymentFinishResponse>, ApiError> {
    let order_id = query
        .order_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Order ID is required".to_string()))?;

    let (info, record_update) = state
        .reconciler()
        .handle(ApplyTransactionStatusCommand {
            order_id: order_id.clone(),
            transaction_status: query.transaction_status,
            enrichment: None,
        })
        .await;

    Ok(Json(PaymentFinishResponse {
        success: info.is_paid,
        message: info.status.finish_message(),
        order_id,
        status: info.status,
        is_paid: info.is_paid,
        record_update,
    }))
}

/// GET /payment-status/:order_id - Live status lookup by path parameter
pub async fn payment_status_by_path(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    payment_status(state, Some(order_id)).await
}

/// POST /payment-status - Live status lookup by body
pub async fn payment_status_by_body(
    State(state): State<AppState>,
    Json(request): Json<PaymentStatusRequest>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    payment_status(state, request.order_id).await
}

/// Shared flow: poll the gateway, reconcile the store, read back the record.
async fn payment_status(
    state: AppState,
    order_id: Option<String>,
) -> Result<Json<PaymentStatusResponse>, ApiError> {
    let order_id = order_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Order ID is required".to_string()))?;

    let gateway = state
        .gateway
        .as_ref()
        .ok_or(ApiError::NotConfigured("Midtrans not configured"))?;

    let tx = gateway
        .transaction_status(&order_id)
        .await
        .map_err(|source| ApiError::Gateway {
            context: "Failed to check payment status",
            order_id: Some(order_id.clone()),
            source,
        })?;

    let enrichment = TransactionEnrichment {
        payment_type: tx.payment_type.clone(),
        transaction_time: tx.transaction_time.clone(),
        gross_amount: tx.gross_amount.clone(),
        fraud_status: tx.fraud_status.clone(),
        currency: tx.currency.clone(),
    };

    let (info, record_update) = state
        .reconciler()
        .handle(ApplyTransactionStatusCommand {
            order_id: order_id.clone(),
            transaction_status: tx.transaction_status.clone(),
            enrichment: Some(enrichment),
        })
        .await;

    // Read back the current stored record; a read failure here must not
    // fail the response.
    let record = match &state.record_store {
        Some(store) => match store.fetch(&order_id).await {
            Ok(record) => record,
            Err(err) => {
                tracing::error!(order_id = %order_id, error = %err, "record read-back failed");
                None
            }
        },
        None => None,
    };

    Ok(Json(PaymentStatusResponse {
        success: true,
        order_id,
        status: info.status,
        is_paid: info.is_paid,
        transaction_status: tx.transaction_status,
        payment_type: tx.payment_type,
        transaction_time: tx.transaction_time,
        gross_amount: tx.gross_amount,
        record_update,
        record,
    }))
}
