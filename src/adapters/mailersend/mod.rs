//! MailerSend email adapter.

mod client;

pub use client::{MailerSendClient, MailerSendConfig};
