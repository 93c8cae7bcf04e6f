//! Payment record model.
//!
//! Records live in the external document store, keyed by order id, and are
//! created by the frontend before checkout begins. The proxy only mutates
//! existing records; it never creates one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::PaymentStatus;

/// A payment record as stored in the `payments` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Normalized status.
    pub status: PaymentStatus,

    /// Whether funds were captured.
    pub is_paid: bool,

    /// Raw gateway status the normalization was derived from.
    #[serde(default)]
    pub transaction_status: String,

    /// Gateway payment method (e.g. "qris", "bank_transfer").
    #[serde(default)]
    pub payment_type: Option<String>,

    /// Gateway-reported transaction time.
    #[serde(default)]
    pub transaction_time: Option<String>,

    /// Gateway-reported amount, as delivered (e.g. "10000.00").
    #[serde(default)]
    pub gross_amount: Option<String>,

    /// Gateway fraud assessment.
    #[serde(default)]
    pub fraud_status: Option<String>,

    /// Transaction currency.
    #[serde(default)]
    pub currency: Option<String>,

    /// When this proxy last updated the record.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Enrichment fields copied from a gateway notification or status poll.
///
/// All optional: a webhook may omit any of them, and the payment-finish
/// redirect carries none at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionEnrichment {
    pub payment_type: Option<String>,
    pub transaction_time: Option<String>,
    pub gross_amount: Option<String>,
    pub fraud_status: Option<String>,
    pub currency: Option<String>,
}

/// Field-level patch applied to an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPatch {
    pub status: PaymentStatus,
    pub is_paid: bool,
    pub transaction_status: String,
    pub updated_at: DateTime<Utc>,

    /// When present, all five enrichment fields are written, absent ones as
    /// null. When absent, existing enrichment values are left untouched.
    pub enrichment: Option<TransactionEnrichment>,
}

impl RecordPatch {
    /// Apply this patch to a fetched record.
    ///
    /// Mirrors the store-side merge so fake stores in tests behave like the
    /// real one.
    pub fn apply_to(&self, record: &mut PaymentRecord) {
        record.status = self.status;
        record.is_paid = self.is_paid;
        record.transaction_status = self.transaction_status.clone();
        record.updated_at = Some(self.updated_at);

        if let Some(enrichment) = &self.enrichment {
            record.payment_type = enrichment.payment_type.clone();
            record.transaction_time = enrichment.transaction_time.clone();
            record.gross_amount = enrichment.gross_amount.clone();
            record.fraud_status = enrichment.fraud_status.clone();
            record.currency = enrichment.currency.clone();
        }
    }
}
