//! Midtrans payment gateway adapter.

mod client;

pub use client::{MidtransClient, MidtransClientConfig};
