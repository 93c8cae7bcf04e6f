//! Application handlers.
//!
//! Command handlers that orchestrate domain operations over the ports.

pub mod payment;

pub use payment::{
    ApplyTransactionStatusCommand, ApplyTransactionStatusHandler, RecordUpdateResult,
};
