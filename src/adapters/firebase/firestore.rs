//! Firestore REST adapter for the payments collection.
//!
//! Documents live at
//! `projects/{project}/databases/(default)/documents/payments/{order_id}`.
//! Updates send a field mask plus an existence precondition, so only the
//! patched fields change and a missing record is never created.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::domain::payment::{PaymentRecord, PaymentStatus, RecordPatch};
use crate::ports::{PaymentRecordStore, StoreError};

use super::token::TokenProvider;

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";
const COLLECTION: &str = "payments";
const IO_TIMEOUT: Duration = Duration::from_secs(10);

/// Firestore-backed payment record store.
pub struct FirestoreRecordStore {
    project_id: String,
    tokens: Arc<TokenProvider>,
    http_client: reqwest::Client,
    base_url: String,
}

impl FirestoreRecordStore {
    /// Create a store for the given project.
    pub fn new(project_id: impl Into<String>, tokens: Arc<TokenProvider>) -> Self {
        Self {
            project_id: project_id.into(),
            tokens,
            http_client: reqwest::Client::new(),
            base_url: FIRESTORE_BASE.to_string(),
        }
    }

    /// Set a custom Firestore base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn document_url(&self, order_id: &str) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url, self.project_id, COLLECTION, order_id
        )
    }

    async fn bearer(&self) -> Result<String, StoreError> {
        self.tokens
            .access_token()
            .await
            .map_err(|err| StoreError::new(err.message))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Value Mapping
// ════════════════════════════════════════════════════════════════════════════════

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn optional_string_value(value: &Option<String>) -> Value {
    match value {
        Some(s) => string_value(s),
        None => json!({ "nullValue": null }),
    }
}

fn timestamp_value(ts: DateTime<Utc>) -> Value {
    json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

/// Encode a patch as Firestore typed fields.
///
/// Returns the fields object together with the field paths for the update
/// mask, so the patch touches exactly the listed fields.
fn fields_from_patch(patch: &RecordPatch) -> (Map<String, Value>, Vec<&'static str>) {
    let mut fields = Map::new();
    let mut paths = vec!["status", "is_paid", "transaction_status", "updated_at"];

    fields.insert("status".to_string(), string_value(patch.status.as_str()));
    fields.insert("is_paid".to_string(), json!({ "booleanValue": patch.is_paid }));
    fields.insert(
        "transaction_status".to_string(),
        string_value(&patch.transaction_status),
    );
    fields.insert("updated_at".to_string(), timestamp_value(patch.updated_at));

    if let Some(enrichment) = &patch.enrichment {
        paths.extend([
            "payment_type",
            "transaction_time",
            "gross_amount",
            "fraud_status",
            "currency",
        ]);
        fields.insert(
            "payment_type".to_string(),
            optional_string_value(&enrichment.payment_type),
        );
        fields.insert(
            "transaction_time".to_string(),
            optional_string_value(&enrichment.transaction_time),
        );
        fields.insert(
            "gross_amount".to_string(),
            optional_string_value(&enrichment.gross_amount),
        );
        fields.insert(
            "fraud_status".to_string(),
            optional_string_value(&enrichment.fraud_status),
        );
        fields.insert(
            "currency".to_string(),
            optional_string_value(&enrichment.currency),
        );
    }

    (fields, paths)
}

fn read_string(fields: &Value, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn read_bool(fields: &Value, name: &str) -> Option<bool> {
    fields
        .get(name)
        .and_then(|v| v.get("booleanValue"))
        .and_then(Value::as_bool)
}

fn read_timestamp(fields: &Value, name: &str) -> Option<DateTime<Utc>> {
    fields
        .get(name)
        .and_then(|v| v.get("timestampValue"))
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decode a Firestore document's fields into a payment record.
fn record_from_fields(fields: &Value) -> PaymentRecord {
    let status = read_string(fields, "status")
        .map(|s| PaymentStatus::parse(&s))
        .unwrap_or(PaymentStatus::Unknown);

    PaymentRecord {
        status,
        is_paid: read_bool(fields, "is_paid").unwrap_or(false),
        transaction_status: read_string(fields, "transaction_status").unwrap_or_default(),
        payment_type: read_string(fields, "payment_type"),
        transaction_time: read_string(fields, "transaction_time"),
        gross_amount: read_string(fields, "gross_amount"),
        fraud_status: read_string(fields, "fraud_status"),
        currency: read_string(fields, "currency"),
        updated_at: read_timestamp(fields, "updated_at"),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Store Implementation
// ════════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl PaymentRecordStore for FirestoreRecordStore {
    async fn fetch(&self, order_id: &str) -> Result<Option<PaymentRecord>, StoreError> {
        let token = self.bearer().await?;

        let response = self
            .http_client
            .get(self.document_url(order_id))
            .bearer_auth(token)
            .timeout(IO_TIMEOUT)
            .send()
            .await
            .map_err(|err| StoreError::new(format!("Record fetch failed: {}", err)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StoreError::new(format!(
                "Record fetch returned {}",
                response.status()
            )));
        }

        let document: Value = response
            .json()
            .await
            .map_err(|err| StoreError::new(format!("Invalid document response: {}", err)))?;

        let fields = document.get("fields").cloned().unwrap_or(Value::Null);
        Ok(Some(record_from_fields(&fields)))
    }

    async fn update(&self, order_id: &str, patch: &RecordPatch) -> Result<(), StoreError> {
        let token = self.bearer().await?;
        let (fields, paths) = fields_from_patch(patch);

        let mut query: Vec<(&str, &str)> = paths
            .iter()
            .map(|path| ("updateMask.fieldPaths", *path))
            .collect();
        // Existence precondition: patching a missing document must fail,
        // never create it.
        query.push(("currentDocument.exists", "true"));

        let response = self
            .http_client
            .patch(self.document_url(order_id))
            .bearer_auth(token)
            .timeout(IO_TIMEOUT)
            .query(&query)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|err| StoreError::new(format!("Record update failed: {}", err)))?;

        if !response.status().is_success() {
            return Err(StoreError::new(format!(
                "Record update returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
