//! Webhook signature verification.
//!
//! Midtrans signs every notification with a SHA-512 digest over the
//! concatenation `order_id + status_code + gross_amount + server_key`,
//! rendered as lowercase hex. This digest is the sole trust boundary in
//! front of the status-update endpoint, so comparison is constant-time.
//!
//! Field order and the delimiter-free concatenation must match the
//! gateway's published algorithm exactly; any deviation rejects every
//! legitimate webhook.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Render bytes as lowercase hex.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Compute the expected signature for a notification.
pub fn expected_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &SecretString,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.expose_secret().as_bytes());
    hex_encode(&hasher.finalize())
}

/// Verify a supplied `signature_key` against the expected digest.
///
/// Absent `status_code` / `gross_amount` contribute the empty string, so a
/// notification missing them only verifies if it was signed the same way.
pub fn verify_signature(
    order_id: &str,
    status_code: Option<&str>,
    gross_amount: Option<&str>,
    signature_key: &str,
    server_key: &SecretString,
) -> bool {
    let expected = expected_signature(
        order_id,
        status_code.unwrap_or(""),
        gross_amount.unwrap_or(""),
        server_key,
    );

    expected.as_bytes().ct_eq(signature_key.as_bytes()).into()
}
