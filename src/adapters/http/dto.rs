//! Request and response DTOs for the proxy endpoints.
//!
//! Request types keep every field optional so validation can enumerate the
//! exact missing names instead of failing at deserialization. Response
//! types all carry the `success` envelope flag.

use serde::{Deserialize, Serialize};

use crate::application::handlers::RecordUpdateResult;
use crate::domain::payment::{PaymentRecord, PaymentStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,

    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateSnapTokenRequest {
    pub order_id: Option<String>,
    pub gross_amount: Option<u64>,
    pub customer_details: Option<CustomerDetailsDto>,
    pub item_details: Option<Vec<ItemDetailDto>>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetailsDto {
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemDetailDto {
    pub id: String,
    pub price: u64,
    pub quantity: u32,
    pub name: String,
}

/// Gateway webhook notification body.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub order_id: Option<String>,
    pub status_code: Option<String>,
    pub gross_amount: Option<String>,
    pub signature_key: Option<String>,
    pub transaction_status: Option<String>,
    pub payment_type: Option<String>,
    pub transaction_time: Option<String>,
    pub fraud_status: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentFinishQuery {
    pub order_id: Option<String>,
    pub transaction_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub order_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct ServiceInfoResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub firebase_enabled: bool,
    pub email_config_ok: bool,
    pub midtrans_config_ok: bool,
    pub note: &'static str,
    pub endpoints: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub firebase_enabled: bool,
    pub email_config_ok: bool,
    pub midtrans_config_ok: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: &'static str,
    pub recipient: String,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub success: bool,
    pub message: &'static str,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SnapTokenResponse {
    pub success: bool,
    pub snap_token: String,
    pub order_id: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: &'static str,
    pub order_id: String,
    pub status: PaymentStatus,
    pub is_paid: bool,
    pub record_update: RecordUpdateResult,
}

#[derive(Debug, Serialize)]
pub struct PaymentFinishResponse {
    pub success: bool,
    pub message: &'static str,
    pub order_id: String,
    pub status: PaymentStatus,
    pub is_paid: bool,
    pub record_update: RecordUpdateResult,
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub order_id: String,
    pub status: PaymentStatus,
    pub is_paid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_amount: Option<String>,

    pub record_update: RecordUpdateResult,

    /// Current stored record, when the store is enabled and has one.
    pub record: Option<PaymentRecord>,
}
