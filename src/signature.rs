//! HMAC-SHA256 signature codec for webhook payloads.
//!
//! The signed message is `"{timestamp}.{payload}"`, where `payload` is the raw
//! request body exactly as received. Digests are lowercase hex.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the hex-encoded HMAC-SHA256 digest of `"{timestamp}.{payload}"`.
///
/// The payload bytes are fed to the MAC unchanged, so any byte-level change
/// to the body yields a different digest.
///
/// # Example
///
/// ```
/// use checkout_client::signature::compute_signature;
///
/// let digest = compute_signature(1, b"hello", "key");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, compute_signature(1, b"hello", "key"));
/// ```
///
/// # Panics
///
/// Never in practice: HMAC accepts keys of any length, so key setup cannot
/// fail.
#[must_use]
pub fn compute_signature(timestamp: i64, payload: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Compares two digest strings in constant time.
///
/// Returns `false` when the lengths differ. Length is not secret (every
/// valid digest has the same length), so only the content comparison needs
/// to be timing-safe.
#[must_use]
pub fn secure_compare(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
