//! Payment reconciliation handlers.

mod apply_transaction_status;

pub use apply_transaction_status::{
    ApplyTransactionStatusCommand, ApplyTransactionStatusHandler, RecordUpdateResult,
};
