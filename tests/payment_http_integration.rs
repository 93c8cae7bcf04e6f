//! Integration tests for the proxy HTTP endpoints.
//!
//! These tests wire the handlers to mock ports and verify:
//! 1. Required-field validation enumerates the missing names
//! 2. The webhook flow verifies signatures before touching the store
//! 3. Status lookups map, persist, and read back records
//! 4. Gateway and identity failures surface with the documented statuses

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use secrecy::SecretString;
use serde_json::json;

use payment_backend::adapters::http::dto::{
    PaymentFinishQuery, PaymentStatusRequest, ResetPasswordRequest, SendOtpRequest,
    WebhookRequest,
};
use payment_backend::adapters::http::handlers::{
    midtrans_webhook, payment_finish, payment_status_by_body, payment_status_by_path,
    reset_password, send_otp,
};
use payment_backend::adapters::http::{app_router, ApiError, AppState};
use payment_backend::domain::payment::{
    expected_signature, PaymentRecord, PaymentStatus, RecordPatch,
};
use payment_backend::ports::{
    EmailError, EmailMessage, EmailSender, GatewayError, IdentityError, IdentityProvider,
    IdentityUser, PaymentGateway, PaymentRecordStore, SnapRequest, SnapToken, StoreError,
    TransactionStatusResponse,
};

use async_trait::async_trait;
use tower::ServiceExt;

// =============================================================================
// Test Infrastructure
// =============================================================================

const TEST_SERVER_KEY: &str = "SB-Mid-server-integration-test";

/// Mock email sender recording every accepted message.
struct MockEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl MockEmailSender {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Mock gateway with a fixed set of known transactions.
struct MockGateway {
    transactions: HashMap<String, TransactionStatusResponse>,
}

impl MockGateway {
    fn with_settlement(order_id: &str) -> Self {
        let mut transactions = HashMap::new();
        transactions.insert(
            order_id.to_string(),
            TransactionStatusResponse {
                order_id: order_id.to_string(),
                transaction_status: Some("settlement".to_string()),
                status_code: Some("200".to_string()),
                payment_type: Some("qris".to_string()),
                transaction_time: Some("2026-01-05 10:00:00".to_string()),
                gross_amount: Some("10000.00".to_string()),
                fraud_status: Some("accept".to_string()),
                currency: Some("IDR".to_string()),
            },
        );
        Self { transactions }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_snap_token(&self, request: SnapRequest) -> Result<SnapToken, GatewayError> {
        Ok(SnapToken {
            token: format!("snap-token-{}", request.order_id),
            redirect_url: None,
        })
    }

    async fn transaction_status(
        &self,
        order_id: &str,
    ) -> Result<TransactionStatusResponse, GatewayError> {
        self.transactions
            .get(order_id)
            .cloned()
            .ok_or_else(|| GatewayError::order_not_found(order_id))
    }
}

/// In-memory record store mirroring the update-if-exists contract.
struct MockRecordStore {
    records: Mutex<HashMap<String, PaymentRecord>>,
}

impl MockRecordStore {
    fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    fn with_pending(order_id: &str) -> Self {
        let store = Self::new();
        store.records.lock().unwrap().insert(
            order_id.to_string(),
            PaymentRecord {
                status: PaymentStatus::Pending,
                is_paid: false,
                transaction_status: "pending".to_string(),
                payment_type: None,
                transaction_time: None,
                gross_amount: None,
                fraud_status: None,
                currency: None,
                updated_at: None,
            },
        );
        store
    }

    fn record(&self, order_id: &str) -> Option<PaymentRecord> {
        self.records.lock().unwrap().get(order_id).cloned()
    }

    fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentRecordStore for MockRecordStore {
    async fn fetch(&self, order_id: &str) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(order_id).cloned())
    }

    async fn update(&self, order_id: &str, patch: &RecordPatch) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(order_id)
            .ok_or_else(|| StoreError::new("no document to update"))?;
        patch.apply_to(record);
        Ok(())
    }
}

/// Mock identity provider with one known account.
struct MockIdentityProvider {
    known_email: String,
    password_updates: Mutex<Vec<(String, String)>>,
}

impl MockIdentityProvider {
    fn with_user(email: &str) -> Self {
        Self {
            known_email: email.to_string(),
            password_updates: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn find_user_by_email(&self, email: &str) -> Result<IdentityUser, IdentityError> {
        if email == self.known_email {
            Ok(IdentityUser {
                uid: "uid-123".to_string(),
                email: email.to_string(),
            })
        } else {
            Err(IdentityError::user_not_found(email))
        }
    }

    async fn set_password(&self, uid: &str, new_password: &str) -> Result<(), IdentityError> {
        self.password_updates
            .lock()
            .unwrap()
            .push((uid.to_string(), new_password.to_string()));
        Ok(())
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn state_with(
    store: Option<Arc<MockRecordStore>>,
    gateway: Option<Arc<MockGateway>>,
) -> AppState {
    AppState {
        email_sender: Some(Arc::new(MockEmailSender::new())),
        gateway: gateway.map(|g| g as Arc<dyn PaymentGateway>),
        record_store: store.map(|s| s as Arc<dyn PaymentRecordStore>),
        identity: Some(Arc::new(MockIdentityProvider::with_user("user@example.com"))),
        gateway_server_key: Some(SecretString::new(TEST_SERVER_KEY.to_string())),
    }
}

fn signed_webhook(order_id: &str, transaction_status: &str) -> WebhookRequest {
    let key = SecretString::new(TEST_SERVER_KEY.to_string());
    let signature = expected_signature(order_id, "200", "10000.00", &key);

    serde_json::from_value(json!({
        "order_id": order_id,
        "status_code": "200",
        "gross_amount": "10000.00",
        "signature_key": signature,
        "transaction_status": transaction_status,
        "payment_type": "qris",
        "currency": "IDR",
    }))
    .unwrap()
}

// =============================================================================
// Webhook Scenarios
// =============================================================================

#[tokio::test]
async fn webhook_with_valid_signature_updates_the_record() {
    let store = Arc::new(MockRecordStore::with_pending("ORD1"));
    let state = state_with(Some(store.clone()), None);

    let Json(response) = midtrans_webhook(State(state), Json(signed_webhook("ORD1", "settlement")))
        .await
        .expect("webhook must succeed");

    assert!(response.success);
    assert_eq!(response.status, PaymentStatus::Success);
    assert!(response.is_paid);
    assert!(response.record_update.success);

    let record = store.record("ORD1").unwrap();
    assert_eq!(record.status, PaymentStatus::Success);
    assert!(record.is_paid);
    assert_eq!(record.transaction_status, "settlement");
    assert_eq!(record.payment_type.as_deref(), Some("qris"));
}

#[tokio::test]
async fn webhook_with_tampered_signature_is_rejected_without_store_access() {
    let store = Arc::new(MockRecordStore::with_pending("ORD1"));
    let state = state_with(Some(store.clone()), None);

    let mut request = signed_webhook("ORD1", "settlement");
    let mut signature = request.signature_key.take().unwrap();
    let last = signature.pop().unwrap();
    signature.push(if last == '0' { '1' } else { '0' });
    request.signature_key = Some(signature);

    let err = midtrans_webhook(State(state), Json(request))
        .await
        .expect_err("tampered signature must be rejected");

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The record must be untouched.
    let record = store.record("ORD1").unwrap();
    assert_eq!(record.status, PaymentStatus::Pending);
    assert!(!record.is_paid);
}

#[tokio::test]
async fn webhook_enumerates_missing_fields() {
    let state = state_with(None, None);
    let request: WebhookRequest =
        serde_json::from_value(json!({ "order_id": "ORD1" })).unwrap();

    let err = midtrans_webhook(State(state), Json(request)).await.unwrap_err();

    match err {
        ApiError::MissingFields(fields) => {
            assert_eq!(fields, vec!["signature_key", "transaction_status"]);
        }
        other => panic!("expected MissingFields, got {:?}", other),
    }
}

#[tokio::test]
async fn webhook_for_unknown_order_reports_not_found_update() {
    let store = Arc::new(MockRecordStore::new());
    let state = state_with(Some(store.clone()), None);

    let Json(response) = midtrans_webhook(State(state), Json(signed_webhook("ORD-NEW", "settlement")))
        .await
        .expect("webhook itself still succeeds");

    assert!(response.success);
    assert!(!response.record_update.success);
    assert!(response.record_update.message.contains("not found"));
    assert_eq!(store.len(), 0, "the webhook must never create a record");
}

// =============================================================================
// Payment Status Scenarios
// =============================================================================

#[tokio::test]
async fn payment_status_maps_persists_and_reads_back() {
    let store = Arc::new(MockRecordStore::with_pending("ORD1"));
    let gateway = Arc::new(MockGateway::with_settlement("ORD1"));
    let state = state_with(Some(store.clone()), Some(gateway));

    let Json(response) = payment_status_by_path(State(state), Path("ORD1".to_string()))
        .await
        .expect("status lookup must succeed");

    assert!(response.success);
    assert_eq!(response.status, PaymentStatus::Success);
    assert!(response.is_paid);
    assert_eq!(response.transaction_status.as_deref(), Some("settlement"));
    assert!(response.record_update.success);

    let record = response.record.as_ref().expect("read-back record");
    assert_eq!(record.status, PaymentStatus::Success);
    assert_eq!(record.gross_amount.as_deref(), Some("10000.00"));
    assert_eq!(store.record("ORD1").unwrap().status, PaymentStatus::Success);
}

#[tokio::test]
async fn payment_status_for_unknown_order_is_a_404() {
    let gateway = Arc::new(MockGateway::with_settlement("ORD1"));
    let state = state_with(None, Some(gateway));

    let err = payment_status_by_path(State(state), Path("ORD2".to_string()))
        .await
        .expect_err("unknown order must fail");

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payment_status_by_body_requires_an_order_id() {
    let state = state_with(None, Some(Arc::new(MockGateway::with_settlement("ORD1"))));
    let request = PaymentStatusRequest { order_id: None };

    let err = payment_status_by_body(State(state), Json(request)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payment_status_without_gateway_is_not_configured() {
    let state = AppState::disabled();

    let err = payment_status_by_path(State(state), Path("ORD1".to_string()))
        .await
        .unwrap_err();

    assert_eq!(
        err.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// =============================================================================
// Payment Finish Scenarios
// =============================================================================

#[tokio::test]
async fn payment_finish_reports_the_human_readable_outcome() {
    let store = Arc::new(MockRecordStore::with_pending("ORD1"));
    let state = state_with(Some(store.clone()), None);

    let Json(response) = payment_finish(
        State(state),
        Query(PaymentFinishQuery {
            order_id: Some("ORD1".to_string()),
            transaction_status: Some("settlement".to_string()),
        }),
    )
    .await
    .expect("finish redirect must succeed");

    assert!(response.success);
    assert_eq!(response.message, "Payment completed successfully");
    assert_eq!(store.record("ORD1").unwrap().status, PaymentStatus::Success);
}

#[tokio::test]
async fn payment_finish_with_pending_status_is_not_success() {
    let state = state_with(None, None);

    let Json(response) = payment_finish(
        State(state),
        Query(PaymentFinishQuery {
            order_id: Some("ORD1".to_string()),
            transaction_status: Some("pending".to_string()),
        }),
    )
    .await
    .unwrap();

    assert!(!response.success);
    assert_eq!(response.message, "Payment is still pending");
}

#[tokio::test]
async fn payment_finish_requires_an_order_id() {
    let state = state_with(None, None);

    let err = payment_finish(
        State(state),
        Query(PaymentFinishQuery {
            order_id: None,
            transaction_status: None,
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Email Scenarios
// =============================================================================

#[tokio::test]
async fn send_otp_forwards_to_the_provider() {
    let sender = Arc::new(MockEmailSender::new());
    let state = AppState {
        email_sender: Some(sender.clone()),
        ..AppState::disabled()
    };

    let request: SendOtpRequest = serde_json::from_value(json!({
        "from": "noreply@example.com",
        "to": "user@example.com",
        "subject": "Your OTP",
        "text": "123456"
    }))
    .unwrap();

    let Json(response) = send_otp(State(state), Json(request)).await.unwrap();
    assert!(response.success);
    assert_eq!(response.recipient, "user@example.com");

    let sent = sender.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Your OTP");
}

#[tokio::test]
async fn send_otp_requires_text_or_html() {
    let state = state_with(None, None);
    let request: SendOtpRequest = serde_json::from_value(json!({
        "from": "noreply@example.com",
        "to": "user@example.com",
        "subject": "Your OTP"
    }))
    .unwrap();

    let err = send_otp(State(state), Json(request)).await.unwrap_err();

    match err {
        ApiError::Validation(message) => {
            assert_eq!(message, "Either text or html content is required");
        }
        other => panic!("expected Validation, got {:?}", other),
    }
}

#[tokio::test]
async fn send_otp_enumerates_missing_fields() {
    let state = state_with(None, None);
    let request: SendOtpRequest =
        serde_json::from_value(json!({ "text": "123456" })).unwrap();

    let err = send_otp(State(state), Json(request)).await.unwrap_err();

    match err {
        ApiError::MissingFields(fields) => {
            assert_eq!(fields, vec!["from", "to", "subject"]);
        }
        other => panic!("expected MissingFields, got {:?}", other),
    }
}

// =============================================================================
// Full Router Scenarios
// =============================================================================

#[tokio::test]
async fn router_serves_health_and_lists_unknown_routes() {
    let app = app_router(AppState::disabled());

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .uri("/health")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "OK");
    assert_eq!(parsed["firebase_enabled"], false);
    assert_eq!(parsed["midtrans_config_ok"], false);

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/no-such-route")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["success"], false);
    assert_eq!(parsed["message"], "Route not found");
    assert_eq!(parsed["path"], "/no-such-route");
    assert_eq!(parsed["available_endpoints"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn router_processes_a_signed_webhook_end_to_end() {
    let store = Arc::new(MockRecordStore::with_pending("ORD1"));
    let app = app_router(state_with(Some(store.clone()), None));

    let key = SecretString::new(TEST_SERVER_KEY.to_string());
    let signature = expected_signature("ORD1", "200", "10000.00", &key);
    let body = json!({
        "order_id": "ORD1",
        "status_code": "200",
        "gross_amount": "10000.00",
        "signature_key": signature,
        "transaction_status": "settlement",
    })
    .to_string();

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/midtrans-webhook")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["success"], true);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["is_paid"], true);
    assert_eq!(parsed["record_update"]["success"], true);

    assert_eq!(store.record("ORD1").unwrap().status, PaymentStatus::Success);
}

// =============================================================================
// Password Reset Scenarios
// =============================================================================

#[tokio::test]
async fn reset_password_updates_a_known_user() {
    let identity = Arc::new(MockIdentityProvider::with_user("user@example.com"));
    let state = AppState {
        identity: Some(identity.clone()),
        ..AppState::disabled()
    };

    let request = ResetPasswordRequest {
        email: Some("user@example.com".to_string()),
        new_password: Some("hunter22".to_string()),
    };

    let Json(response) = reset_password(State(state), Json(request)).await.unwrap();
    assert!(response.success);
    assert_eq!(response.email, "user@example.com");

    let updates = identity.password_updates.lock().unwrap();
    assert_eq!(updates.as_slice(), &[("uid-123".to_string(), "hunter22".to_string())]);
}

#[tokio::test]
async fn reset_password_for_unknown_user_is_a_404() {
    let state = state_with(None, None);

    let request = ResetPasswordRequest {
        email: Some("stranger@example.com".to_string()),
        new_password: Some("hunter22".to_string()),
    };

    let err = reset_password(State(state), Json(request)).await.unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_password_rejects_short_passwords_and_bad_emails() {
    let state = state_with(None, None);

    let err = reset_password(
        State(state.clone()),
        Json(ResetPasswordRequest {
            email: Some("user@example.com".to_string()),
            new_password: Some("abc".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

    let err = reset_password(
        State(state),
        Json(ResetPasswordRequest {
            email: Some("not-an-email".to_string()),
            new_password: Some("hunter22".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}
