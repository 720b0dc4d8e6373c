//! Credential acquisition and caching.
//!
//! The credential manager obtains short-lived credentials per provider
//! using the scheme declared in the registry, and owns the only shared
//! mutable state in the gateway: the token cache. Access to a provider's
//! cache entry is serialized through a per-provider async mutex, so
//! concurrent calls for the same provider trigger at most one upstream
//! token fetch while a valid cached credential exists.

mod oauth;
mod session;
mod signing;

pub use session::{SessionCipher, SessionTokenGrant};
pub use signing::sign_url;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, trace};

use tpabridge_config::ProviderProfile;
use tpabridge_core::{AuthScheme, GatewayError, ProviderId, Result};

/// A credential ready to be attached to an outbound request.
#[derive(Debug, Clone)]
pub enum Credential {
    /// The provider needs no authentication.
    None,
    /// Constant shared-secret header.
    Header { name: String, value: String },
    /// OAuth2 bearer token.
    Bearer(String),
    /// Per-request HMAC signature over the target URL, hex-encoded.
    Signature(String),
    /// Encrypted session token plus the session id it belongs to.
    Session { session_id: String, token: String },
}

impl Credential {
    /// Scheme label for logging. Never exposes the secret itself.
    pub fn scheme_label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Header { .. } => "static_header",
            Self::Bearer(_) => "bearer",
            Self::Signature(_) => "hmac_signature",
            Self::Session { .. } => "encrypted_session",
        }
    }
}

/// A cached bearer token and its hard expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Tokens are refreshed this much before their declared expiry, so a
/// token never reaches the provider moments before it lapses.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// Obtains and caches credentials per provider.
pub struct CredentialManager {
    http: reqwest::Client,
    slots: RwLock<HashMap<ProviderId, Arc<Mutex<Option<CachedToken>>>>>,
}

impl CredentialManager {
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should not happen in
    /// practice).
    pub fn new(user_agent: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Obtain a credential for the profile's declared scheme.
    ///
    /// `target_url` is the URL of the request being authenticated; it is
    /// required by the HMAC scheme, which signs the exact target.
    pub async fn obtain(
        &self,
        profile: &ProviderProfile,
        target_url: Option<&str>,
    ) -> Result<Credential> {
        match profile.auth {
            AuthScheme::None => Ok(Credential::None),
            AuthScheme::StaticHeader => {
                let name = profile.credentials.header_name.clone().ok_or_else(|| {
                    GatewayError::internal("static_header auth without header_name")
                })?;
                let value = profile.credentials.header_value.clone().ok_or_else(|| {
                    GatewayError::internal("static_header auth without header_value")
                })?;
                Ok(Credential::Header { name, value })
            }
            AuthScheme::HmacSigned => {
                let secret = profile
                    .credentials
                    .hmac_secret
                    .as_deref()
                    .ok_or_else(|| GatewayError::internal("hmac_signed auth without secret"))?;
                let url = target_url.ok_or_else(|| {
                    GatewayError::internal("hmac_signed auth needs the target URL")
                })?;
                trace!(provider_id = %profile.id, "signing request");
                Ok(Credential::Signature(signing::sign_url(secret, url)))
            }
            AuthScheme::Oauth2Password => self.obtain_bearer(profile).await,
            AuthScheme::EncryptedSession => self.obtain_session(profile).await,
        }
    }

    /// Drop every cached credential. Mainly useful in tests.
    pub async fn clear(&self) {
        self.slots.write().await.clear();
    }

    async fn slot(&self, id: ProviderId) -> Arc<Mutex<Option<CachedToken>>> {
        if let Some(slot) = self.slots.read().await.get(&id) {
            return slot.clone();
        }
        let mut slots = self.slots.write().await;
        slots
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    async fn obtain_bearer(&self, profile: &ProviderProfile) -> Result<Credential> {
        let slot = self.slot(profile.id).await;
        // The slot lock spans check, fetch and store: a concurrent caller
        // waits here instead of racing to a duplicate token request.
        let mut cached = slot.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                trace!(provider_id = %profile.id, "bearer token cache hit");
                return Ok(Credential::Bearer(token.value.clone()));
            }
            debug!(provider_id = %profile.id, "cached bearer token expired");
            *cached = None;
        }

        let (value, lifetime) = oauth::fetch_password_grant_token(&self.http, profile).await?;
        match lifetime {
            Some(lifetime) => {
                *cached = Some(CachedToken {
                    value: value.clone(),
                    expires_at: Instant::now() + lifetime.saturating_sub(EXPIRY_SKEW),
                });
            }
            // No declared expiry: valid for this call only, never cached.
            None => {
                *cached = None;
            }
        }
        Ok(Credential::Bearer(value))
    }

    async fn obtain_session(&self, profile: &ProviderProfile) -> Result<Credential> {
        // Session tokens are single-use upstream; fetched fresh per call.
        let grant = session::fetch_session_token(&self.http, profile).await?;
        let key = profile.session_key().map_err(GatewayError::internal)?;
        let cipher = SessionCipher::new(&key).map_err(GatewayError::internal)?;
        let token = cipher
            .encrypt(&format!("{}|{}", grant.token_key, grant.token_value))
            .map_err(|e| GatewayError::authentication(profile.id, e))?;
        Ok(Credential::Session {
            session_id: grant.session_id,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> CredentialManager {
        CredentialManager::new("tpabridge-test/0")
    }

    #[tokio::test]
    async fn test_none_scheme_yields_no_credential() {
        let profile = ProviderProfile::new(5u16, "Horizon General Insurance");
        let credential = manager().obtain(&profile, None).await.unwrap();
        assert!(matches!(credential, Credential::None));
    }

    #[tokio::test]
    async fn test_static_header_comes_from_profile() {
        let mut profile =
            ProviderProfile::new(2u16, "CarePlus Assist").with_auth(AuthScheme::StaticHeader);
        profile.credentials.header_name = Some("X-Api-Key".into());
        profile.credentials.header_value = Some("uat-key".into());

        let credential = manager().obtain(&profile, None).await.unwrap();
        match credential {
            Credential::Header { name, value } => {
                assert_eq!(name, "X-Api-Key");
                assert_eq!(value, "uat-key");
            }
            other => panic!("expected header credential, got {}", other.scheme_label()),
        }
    }

    #[tokio::test]
    async fn test_hmac_signature_requires_target_url() {
        let mut profile =
            ProviderProfile::new(3u16, "Sentinel TPA").with_auth(AuthScheme::HmacSigned);
        profile.credentials.hmac_secret = Some("secret123".into());

        let err = manager().obtain(&profile, None).await.unwrap_err();
        assert!(matches!(err, GatewayError::Internal(_)));

        let credential = manager()
            .obtain(&profile, Some("https://api.example.com/IntimateClaim"))
            .await
            .unwrap();
        match credential {
            Credential::Signature(sig) => {
                assert_eq!(
                    sig,
                    signing::sign_url("secret123", "https://api.example.com/IntimateClaim")
                );
            }
            other => panic!("expected signature, got {}", other.scheme_label()),
        }
    }

    #[tokio::test]
    async fn test_scheme_labels_expose_no_secrets() {
        let credential = Credential::Bearer("super-secret-token".into());
        assert_eq!(credential.scheme_label(), "bearer");
        let credential = Credential::Session {
            session_id: "S-1".into(),
            token: "ciphertext".into(),
        };
        assert_eq!(credential.scheme_label(), "encrypted_session");
    }
}
