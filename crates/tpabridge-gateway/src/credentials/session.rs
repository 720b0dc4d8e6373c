//! Encrypted-session-token scheme.
//!
//! The provider issues a `{sessionId, tokenKey, tokenValue}` triple from
//! its generate-token endpoint; the gateway then encrypts
//! `tokenKey|tokenValue` with a shared symmetric key and sends the
//! ciphertext alongside the session id. Upstream tokens are treated as
//! single-use: a fresh triple is fetched for every call.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use tpabridge_config::ProviderProfile;
use tpabridge_core::{GatewayError, Result};

use crate::wire::excerpt;

/// Session-token triple as issued by the provider.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokenGrant {
    pub session_id: String,
    pub token_key: String,
    pub token_value: String,
}

/// Fetch a fresh session-token triple from the provider.
pub(crate) async fn fetch_session_token(
    http: &Client,
    profile: &ProviderProfile,
) -> Result<SessionTokenGrant> {
    let endpoint = profile
        .endpoints
        .token
        .as_deref()
        .ok_or_else(|| GatewayError::internal("encrypted_session auth without token endpoint"))?;

    let response = http
        .post(endpoint)
        .timeout(profile.request_timeout())
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| {
            warn!(provider_id = %profile.id, "token issuance unreachable: {e}");
            GatewayError::authentication(profile.id, format!("token endpoint unreachable: {e}"))
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::authentication(profile.id, e.to_string()))?;

    if !status.is_success() {
        warn!(
            provider_id = %profile.id,
            status = status.as_u16(),
            body = %excerpt(&body, 120),
            "token issuance rejected"
        );
        return Err(GatewayError::authentication(
            profile.id,
            format!("token endpoint returned HTTP {status}"),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        GatewayError::authentication(profile.id, format!("unparseable token response: {e}"))
    })
}

/// AES-256-GCM cipher for session-token material.
///
/// Ciphertexts are nonce-prefixed and base64-encoded; the nonce is random
/// per encryption, so encrypting the same token twice yields different
/// ciphertexts.
pub struct SessionCipher {
    cipher: Aes256Gcm,
}

impl SessionCipher {
    /// Build a cipher from a 32-byte key.
    pub fn new(key: &[u8]) -> std::result::Result<Self, String> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| format!("session key must be 32 bytes, got {}", key.len()))?;
        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &str) -> std::result::Result<String, String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| format!("session token encryption failed: {e}"))?;
        let mut out = nonce.to_vec();
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> std::result::Result<String, String> {
        let raw = BASE64
            .decode(encoded)
            .map_err(|e| format!("ciphertext is not valid base64: {e}"))?;
        if raw.len() < 12 {
            return Err("ciphertext shorter than its nonce".into());
        }
        let (nonce, ciphertext) = raw.split_at(12);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| format!("session token decryption failed: {e}"))?;
        String::from_utf8(plaintext).map_err(|e| format!("decrypted token is not UTF-8: {e}"))
    }
}
