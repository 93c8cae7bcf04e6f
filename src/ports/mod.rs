//! Ports (capability interfaces) for external collaborators.
//!
//! Handlers depend on these traits, never on a concrete SDK or HTTP client,
//! so every external integration can be swapped for a fake in tests.

mod email_sender;
mod identity_provider;
mod payment_gateway;
mod record_store;

pub use email_sender::{EmailError, EmailMessage, EmailSender};
pub use identity_provider::{IdentityError, IdentityErrorCode, IdentityProvider, IdentityUser};
pub use payment_gateway::{
    CustomerDetails, GatewayError, GatewayErrorCode, ItemDetail, PaymentGateway, SnapRequest,
    SnapToken, TransactionStatusResponse,
};
pub use record_store::{PaymentRecordStore, StoreError};
