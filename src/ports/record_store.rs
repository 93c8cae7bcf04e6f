//! Payment record store port.

use async_trait::async_trait;

use crate::domain::payment::{PaymentRecord, RecordPatch};

/// Port for the external document store holding payment records.
///
/// The store never creates records: `update` must fail (or no-op) for an
/// order id without an existing document. Record creation is the frontend's
/// responsibility.
#[async_trait]
pub trait PaymentRecordStore: Send + Sync {
    /// Fetch a record by order id. `Ok(None)` when no record exists.
    async fn fetch(&self, order_id: &str) -> Result<Option<PaymentRecord>, StoreError>;

    /// Patch an existing record.
    async fn update(&self, order_id: &str, patch: &RecordPatch) -> Result<(), StoreError>;
}

/// Store I/O failure.
///
/// Callers fold this into a non-fatal structured result so the primary
/// response can still succeed when persistence does not.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}
