//! Authentication of provider webhook callbacks.
//!
//! The provider signs each callback body with HMAC-SHA1 keyed by a shared
//! webhook token and sends the hex digest in a header. The MAC must be
//! computed over the raw request bytes as received.

use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::error::CryptoError;

type HmacSha1 = Hmac<Sha1>;

/// Hex-encoded HMAC-SHA1 of `raw_body` under `shared_secret`.
pub fn compute_webhook_mac(raw_body: &[u8], shared_secret: &[u8]) -> Result<String, CryptoError> {
    let mut mac =
        HmacSha1::new_from_slice(shared_secret).map_err(|e| CryptoError::Mac(e.to_string()))?;
    mac.update(raw_body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a provided hex MAC against the raw body.
///
/// Returns `false` for malformed hex, wrong-length MACs and an empty
/// secret. The comparison is constant-time.
pub fn authenticate_webhook(raw_body: &[u8], provided_mac_hex: &str, shared_secret: &[u8]) -> bool {
    if shared_secret.is_empty() {
        return false;
    }
    let Ok(provided) = hex::decode(provided_mac_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha1::new_from_slice(shared_secret) else {
        return false;
    };
    mac.update(raw_body);
    mac.verify_slice(&provided).is_ok()
}
