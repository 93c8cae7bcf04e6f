//! API error type translating failures into the JSON envelope.
//!
//! Every endpoint handler returns `Result<_, ApiError>`; this type owns the
//! status-code mapping and renders the `{"success": false, ...}` envelope,
//! forwarding upstream payloads where they are safe to expose.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::ports::{EmailError, GatewayError, IdentityError};

/// Error surfaced by an endpoint handler.
#[derive(Debug)]
pub enum ApiError {
    /// Required fields absent or blank.
    MissingFields(Vec<&'static str>),

    /// Input present but malformed; the message is returned verbatim.
    Validation(String),

    /// The integration backing this endpoint has no credentials.
    NotConfigured(&'static str),

    /// The email provider rejected or failed the send.
    Email(EmailError),

    /// The payment gateway rejected or failed the call.
    Gateway {
        /// Message for the envelope when the failure is not order-not-found.
        context: &'static str,

        /// Order id echoed on order-not-found responses.
        order_id: Option<String>,

        source: GatewayError,
    },

    /// The identity provider rejected the account operation.
    Identity(IdentityError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured(_) | ApiError::Email(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Gateway { source, .. } if source.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Gateway { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Identity(err) => match err.code {
                crate::ports::IdentityErrorCode::UserNotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::MissingFields(fields) => json!({
                "success": false,
                "message": format!("Missing required fields: {}", fields.join(", ")),
            }),

            ApiError::Validation(message) => json!({
                "success": false,
                "message": message,
            }),

            ApiError::NotConfigured(message) => json!({
                "success": false,
                "message": message,
            }),

            ApiError::Email(err) => {
                let detail = err
                    .provider_response
                    .clone()
                    .unwrap_or_else(|| Value::String(err.message.clone()));
                json!({
                    "success": false,
                    "message": "Failed to send OTP email",
                    "error": detail,
                })
            }

            ApiError::Gateway {
                context,
                order_id,
                source,
            } => {
                if source.is_not_found() {
                    let mut body = json!({
                        "success": false,
                        "message": "Order not found in Midtrans",
                    });
                    if let Some(order_id) = order_id {
                        body["order_id"] = Value::String(order_id.clone());
                    }
                    body
                } else {
                    let detail = source
                        .provider_response
                        .clone()
                        .unwrap_or_else(|| Value::String(source.message.clone()));
                    json!({
                        "success": false,
                        "message": context,
                        "error": detail,
                    })
                }
            }

            ApiError::Identity(err) => json!({
                "success": false,
                "message": err.code.user_message(),
                "error_code": err.code.as_str(),
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = ?self, "request failed");
        } else {
            tracing::warn!(status = %status, error = ?self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
