//! ApplyTransactionStatusHandler - folds a gateway-reported status into the
//! stored payment record.
//!
//! This is the reconciliation core shared by the webhook receiver, the
//! payment-finish redirect, and the status lookup. The policy is
//! update-if-exists: records are created upstream by the frontend, and a
//! missing record or store failure is reported as data, never as a request
//! failure.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::domain::payment::{
    map_transaction_status, PaymentStatus, RecordPatch, StatusInfo, TransactionEnrichment,
};
use crate::ports::PaymentRecordStore;

/// Command to reconcile a raw gateway status for one order.
#[derive(Debug, Clone)]
pub struct ApplyTransactionStatusCommand {
    /// Order identifier.
    pub order_id: String,

    /// Raw gateway status, absent on some redirect calls.
    pub transaction_status: Option<String>,

    /// Enrichment fields to store alongside the status, when the caller
    /// received any.
    pub enrichment: Option<TransactionEnrichment>,
}

/// Outcome of a record update attempt.
///
/// Serialized verbatim into API responses as the `record_update` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordUpdateResult {
    pub success: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordUpdateResult {
    /// The record store is not configured; nothing was attempted.
    pub fn not_enabled() -> Self {
        Self {
            success: false,
            message: "Record store not enabled".to_string(),
            status: None,
            is_paid: None,
            error: None,
        }
    }

    /// No record exists for the order id; nothing was written.
    pub fn not_found() -> Self {
        Self {
            success: false,
            message: "Payment record not found - must be created by frontend first".to_string(),
            status: None,
            is_paid: None,
            error: None,
        }
    }

    /// The record was patched with the given status.
    pub fn updated(info: StatusInfo) -> Self {
        Self {
            success: true,
            message: "Payment status updated successfully".to_string(),
            status: Some(info.status),
            is_paid: Some(info.is_paid),
            error: None,
        }
    }

    /// Store I/O failed; the error is carried as data.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: "Failed to update payment record".to_string(),
            status: None,
            is_paid: None,
            error: Some(error.into()),
        }
    }
}

/// Handler implementing the record-update policy: update-if-exists, never
/// create.
///
/// Idempotent: reapplying the same status for the same order converges to
/// the same stored state.
pub struct ApplyTransactionStatusHandler {
    store: Option<Arc<dyn PaymentRecordStore>>,
}

impl ApplyTransactionStatusHandler {
    pub fn new(store: Option<Arc<dyn PaymentRecordStore>>) -> Self {
        Self { store }
    }

    /// Map the raw status and reconcile it into the store.
    ///
    /// Always returns the mapped [`StatusInfo`]; the accompanying
    /// [`RecordUpdateResult`] reports what happened to persistence.
    pub async fn handle(
        &self,
        cmd: ApplyTransactionStatusCommand,
    ) -> (StatusInfo, RecordUpdateResult) {
        let info = map_transaction_status(cmd.transaction_status.as_deref());

        let Some(store) = &self.store else {
            tracing::debug!(order_id = %cmd.order_id, "record store not enabled, skipping update");
            return (info, RecordUpdateResult::not_enabled());
        };

        let existing = match store.fetch(&cmd.order_id).await {
            Ok(existing) => existing,
            Err(err) => {
                tracing::error!(order_id = %cmd.order_id, error = %err, "record fetch failed");
                return (info, RecordUpdateResult::failed(err.message));
            }
        };

        if existing.is_none() {
            tracing::warn!(
                order_id = %cmd.order_id,
                "payment record missing, update skipped"
            );
            return (info, RecordUpdateResult::not_found());
        }

        let patch = RecordPatch {
            status: info.status,
            is_paid: info.is_paid,
            transaction_status: cmd.transaction_status.clone().unwrap_or_default(),
            updated_at: Utc::now(),
            enrichment: cmd.enrichment.clone(),
        };

        match store.update(&cmd.order_id, &patch).await {
            Ok(()) => {
                tracing::info!(
                    order_id = %cmd.order_id,
                    status = %info.status,
                    is_paid = info.is_paid,
                    "payment record updated"
                );
                (info, RecordUpdateResult::updated(info))
            }
            Err(err) => {
                tracing::error!(order_id = %cmd.order_id, error = %err, "record update failed");
                (info, RecordUpdateResult::failed(err.message))
            }
        }
    }
}
