//! Payment Backend - storefront proxy for email, payments, and records
//!
//! This crate bridges a frontend application to three external services:
//! MailerSend (transactional email), Midtrans (payment gateway), and
//! Firebase (payment records and user accounts). Every endpoint validates
//! its input, calls at most one external API, optionally updates the stored
//! payment record, and answers with a normalized JSON envelope.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
