//! Adapters wiring the ports to concrete external services.

pub mod firebase;
pub mod http;
pub mod mailersend;
pub mod midtrans;
