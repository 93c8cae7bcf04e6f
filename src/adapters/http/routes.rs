//! Axum router for the proxy API.
//!
//! Wires every endpoint to its handler and applies the shared layers:
//! request tracing, CORS, and a panic guard that keeps programmer errors
//! inside the JSON envelope.

use std::any::Any;

use axum::http::{header, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    generate_snap_token, health, midtrans_webhook, not_found, payment_finish,
    payment_status_by_body, payment_status_by_path, reset_password, send_otp, service_info,
    AppState,
};

/// Build the complete application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/send-otp", post(send_otp))
        .route("/reset-password", post(reset_password))
        .route("/generate-snap-token", post(generate_snap_token))
        .route("/midtrans-webhook", post(midtrans_webhook))
        .route("/payment-finish", get(payment_finish))
        .route("/payment-status/:order_id", get(payment_status_by_path))
        .route("/payment-status", post(payment_status_by_body))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Permissive CORS, as the deployed frontend expects.
///
/// The browser contract here is any-origin with credentials. A literal `*`
/// origin cannot be combined with credentials, so the layer mirrors the
/// request origin instead. Known permissive characteristic of this proxy,
/// kept deliberately.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::USER_AGENT,
            HeaderName::from_static("ngrok-skip-browser-warning"),
            HeaderName::from_static("x-requested-with"),
        ])
}

/// Translate an escaped panic into the generic 500 envelope.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Internal server error",
        })),
    )
        .into_response()
}
