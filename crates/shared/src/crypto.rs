//! HMAC-SHA256 signing for access capabilities.
//!
//! Signatures are computed over a canonical payload built from ordered
//! fields joined with `:` and rendered as lowercase hex.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Separator used between canonical payload fields.
pub const PAYLOAD_SEPARATOR: &str = ":";

/// Builds the canonical payload from ordered fields.
pub fn canonical_payload(fields: &[&str]) -> String {
    fields.join(PAYLOAD_SEPARATOR)
}

/// Signs `payload` with `secret` and returns the lowercase hex HMAC-SHA256.
pub fn sign(secret: &str, payload: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
    };
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex signature over `payload`.
///
/// The comparison is constant-time. Any failure (bad hex, wrong length,
/// mismatch) yields `false` without saying which.
pub fn verify(secret: &str, payload: &str, signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload.as_bytes());
    mac.verify_slice(&expected).is_ok()
}
