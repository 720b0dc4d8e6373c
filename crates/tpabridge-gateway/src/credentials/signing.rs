//! Per-request HMAC signing.
//!
//! Providers on this scheme require an HMAC-SHA256 signature over the
//! exact target URL, sent in a signature header. Signatures are computed
//! fresh for every call and never cached.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of the target URL.
pub fn sign_url(secret: &str, url: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(url.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
