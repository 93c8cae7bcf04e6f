//! Payment domain: status normalization, webhook signatures, and the
//! payment record model.

mod record;
mod signature;
mod status;

pub use record::{PaymentRecord, RecordPatch, TransactionEnrichment};
pub use signature::{expected_signature, verify_signature};
pub use status::{map_transaction_status, PaymentStatus, StatusInfo};
