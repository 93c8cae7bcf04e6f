//! Transaction status normalization.
//!
//! The gateway reports transaction state as a free-form string; the rest of
//! the system (and the stored payment record) works with the normalized
//! `{status, is_paid}` pair produced here.

use serde::{Deserialize, Serialize};

/// Normalized payment status stored on a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Funds captured or settled.
    Success,

    /// Transaction created, awaiting payment.
    Pending,

    /// Cancelled before completion.
    Cancelled,

    /// Payment window elapsed.
    Expired,

    /// Denied or failed at the gateway.
    Failed,

    /// Unrecognized gateway status.
    Unknown,
}

impl PaymentStatus {
    /// Stable string form, matching the stored record values.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "success",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Unknown => "unknown",
        }
    }

    /// Parse a stored status string back into the enum.
    ///
    /// Anything unrecognized collapses to `Unknown`, so reading a record
    /// written by an older deployment cannot fail.
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => PaymentStatus::Success,
            "pending" => PaymentStatus::Pending,
            "cancelled" => PaymentStatus::Cancelled,
            "expired" => PaymentStatus::Expired,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Unknown,
        }
    }

    /// Human-readable message shown on the payment-finish redirect.
    pub fn finish_message(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "Payment completed successfully",
            PaymentStatus::Pending => "Payment is still pending",
            PaymentStatus::Cancelled => "Payment was cancelled",
            PaymentStatus::Expired => "Payment has expired",
            PaymentStatus::Failed => "Payment failed",
            PaymentStatus::Unknown => "Payment status unknown",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized `{status, is_paid}` pair derived from a raw gateway status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    pub status: PaymentStatus,
    pub is_paid: bool,
}

/// Map a raw Midtrans `transaction_status` onto the normalized pair.
///
/// Total function: every input, including an absent one, produces a defined
/// output. Matching is case-sensitive, exactly as the gateway delivers the
/// status.
pub fn map_transaction_status(raw: Option<&str>) -> StatusInfo {
    let (status, is_paid) = match raw {
        Some("settlement") | Some("capture") => (PaymentStatus::Success, true),
        Some("pending") => (PaymentStatus::Pending, false),
        Some("cancel") => (PaymentStatus::Cancelled, false),
        Some("expire") => (PaymentStatus::Expired, false),
        Some("deny") | Some("failure") => (PaymentStatus::Failed, false),
        _ => (PaymentStatus::Unknown, false),
    };
    StatusInfo { status, is_paid }
}
