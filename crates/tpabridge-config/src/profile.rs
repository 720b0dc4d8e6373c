use std::collections::HashMap;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use url::Url;

use tpabridge_core::{AuthScheme, ProviderId, RetryPolicy};

/// Canonical field names a hospital-table column dictionary may map.
pub const CANONICAL_HOSPITAL_FIELDS: &[&str] = &[
    "hospital_name",
    "address_line_1",
    "address_line_2",
    "city",
    "state",
    "pincode",
    "phone",
    "email",
];

/// Immutable profile of one integrated TPA/insurer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub id: ProviderId,
    pub name: String,

    #[serde(default)]
    pub auth: AuthScheme,

    #[serde(default)]
    pub endpoints: Endpoints,

    /// Deployment secrets. The shipped defaults are placeholders; real
    /// values are injected per environment.
    #[serde(default)]
    pub credentials: ProviderCredentials,

    #[serde(default)]
    pub retry: RetryPolicy,

    /// Bound on every outbound call to this provider, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Column mapping of the provider's backing hospital table. Absent for
    /// providers whose hospital list is only reachable via an external API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_table: Option<HospitalTableMapping>,

    /// Base directory for providers whose e-cards are pre-provisioned
    /// files rather than a live integration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecard_static_dir: Option<String>,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl ProviderProfile {
    /// Minimal profile with defaults; used by tests and the built-in roster.
    pub fn new(id: impl Into<ProviderId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            auth: AuthScheme::None,
            endpoints: Endpoints::default(),
            credentials: ProviderCredentials::default(),
            retry: RetryPolicy::default(),
            request_timeout_ms: default_request_timeout_ms(),
            hospital_table: None,
            ecard_static_dir: None,
        }
    }

    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Decoded AES key for the encrypted-session scheme.
    pub fn session_key(&self) -> Result<Vec<u8>, String> {
        let encoded = self
            .credentials
            .session_key
            .as_deref()
            .ok_or_else(|| format!("provider {}: credentials.session_key is not set", self.id))?;
        BASE64
            .decode(encoded)
            .map_err(|e| format!("provider {}: session_key is not valid base64: {e}", self.id))
    }

    /// Scheme-specific completeness check, run once at registry load.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("provider {}: name must not be empty", self.id));
        }
        if self.request_timeout_ms == 0 {
            return Err(format!(
                "provider {}: request_timeout_ms must be > 0",
                self.id
            ));
        }
        self.retry
            .validate()
            .map_err(|e| format!("provider {}: {e}", self.id))?;
        self.endpoints
            .validate()
            .map_err(|e| format!("provider {}: {e}", self.id))?;

        match self.auth {
            AuthScheme::None => {}
            AuthScheme::StaticHeader => {
                if self.credentials.header_name.is_none()
                    || self.credentials.header_value.is_none()
                {
                    return Err(format!(
                        "provider {}: static_header auth needs credentials.header_name and credentials.header_value",
                        self.id
                    ));
                }
            }
            AuthScheme::Oauth2Password => {
                if self.endpoints.token.is_none() {
                    return Err(format!(
                        "provider {}: oauth2_password auth needs endpoints.token",
                        self.id
                    ));
                }
                if self.credentials.username.is_none() || self.credentials.password.is_none() {
                    return Err(format!(
                        "provider {}: oauth2_password auth needs credentials.username and credentials.password",
                        self.id
                    ));
                }
            }
            AuthScheme::HmacSigned => {
                if self.credentials.hmac_secret.is_none() {
                    return Err(format!(
                        "provider {}: hmac_signed auth needs credentials.hmac_secret",
                        self.id
                    ));
                }
            }
            AuthScheme::EncryptedSession => {
                if self.endpoints.token.is_none() {
                    return Err(format!(
                        "provider {}: encrypted_session auth needs endpoints.token",
                        self.id
                    ));
                }
                let key = self.session_key()?;
                if key.len() != 32 {
                    return Err(format!(
                        "provider {}: session_key must decode to 32 bytes, got {}",
                        self.id,
                        key.len()
                    ));
                }
            }
        }

        if let Some(mapping) = &self.hospital_table {
            mapping
                .validate()
                .map_err(|e| format!("provider {}: {e}", self.id))?;
        }
        Ok(())
    }
}

/// Named upstream URLs, as applicable per provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_intimation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_search: Option<String>,
}

impl Endpoints {
    fn validate(&self) -> Result<(), String> {
        for (label, value) in [
            ("endpoints.claim_intimation", &self.claim_intimation),
            ("endpoints.ecard", &self.ecard),
            ("endpoints.token", &self.token),
            ("endpoints.hospital_search", &self.hospital_search),
        ] {
            if let Some(raw) = value {
                let url = Url::parse(raw).map_err(|e| format!("{label} is not a URL: {e}"))?;
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(format!("{label} must be http(s), got {}", url.scheme()));
                }
            }
        }
        Ok(())
    }
}

/// Per-provider secret material. All fields are optional; the auth scheme
/// decides which ones must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_secret: Option<String>,
    /// 32-byte AES key, base64-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
}

/// Column dictionary of one provider's hospital table.
///
/// Keys are the canonical field names in [`CANONICAL_HOSPITAL_FIELDS`];
/// values are that provider's column names. A canonical field with no
/// entry simply stays absent in search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalTableMapping {
    /// Name of the provider's backing table.
    pub table: String,
    /// Column holding the policy ids a hospital row applies to, if the
    /// table is policy-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_column: Option<String>,
    /// canonical field -> provider column
    pub columns: HashMap<String, String>,
}

impl HospitalTableMapping {
    pub fn column_for(&self, canonical_field: &str) -> Option<&str> {
        self.columns.get(canonical_field).map(String::as_str)
    }

    fn validate(&self) -> Result<(), String> {
        if self.table.trim().is_empty() {
            return Err("hospital_table.table must not be empty".into());
        }
        for key in self.columns.keys() {
            if !CANONICAL_HOSPITAL_FIELDS.contains(&key.as_str()) {
                return Err(format!(
                    "hospital_table.columns has unknown canonical field '{key}' (expected one of {CANONICAL_HOSPITAL_FIELDS:?})"
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> HospitalTableMapping {
        HospitalTableMapping {
            table: "medserve_hospitals".into(),
            policy_column: None,
            columns: HashMap::from([
                ("hospital_name".to_string(), "Name".to_string()),
                ("city".to_string(), "city".to_string()),
            ]),
        }
    }

    #[test]
    fn test_profile_defaults_pass_validation() {
        let profile = ProviderProfile::new(10u16, "Everwell Assurance");
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_static_header_requires_header_fields() {
        let mut profile =
            ProviderProfile::new(2u16, "CarePlus Assist").with_auth(AuthScheme::StaticHeader);
        assert!(profile.validate().is_err());

        profile.credentials.header_name = Some("X-Api-Key".into());
        profile.credentials.header_value = Some("uat-key".into());
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_oauth2_requires_token_endpoint_and_credentials() {
        let mut profile =
            ProviderProfile::new(1u16, "Medserve Health TPA").with_auth(AuthScheme::Oauth2Password);
        assert!(profile.validate().is_err());

        profile.endpoints.token = Some("https://uat.medserve.example.com/oauth/token".into());
        assert!(profile.validate().is_err());

        profile.credentials.username = Some("svc_user".into());
        profile.credentials.password = Some("svc_pass".into());
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_encrypted_session_requires_32_byte_key() {
        let mut profile = ProviderProfile::new(4u16, "UnityCare Administrators")
            .with_auth(AuthScheme::EncryptedSession);
        profile.endpoints.token = Some("https://uat.unitycare.example.com/gettoken".into());

        profile.credentials.session_key = Some(BASE64.encode([1u8; 16]));
        let err = profile.validate().unwrap_err();
        assert!(err.contains("32 bytes"));

        profile.credentials.session_key = Some(BASE64.encode([1u8; 32]));
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_endpoint_urls_are_checked() {
        let mut profile = ProviderProfile::new(5u16, "Horizon General Insurance");
        profile.endpoints.claim_intimation = Some("not a url".into());
        assert!(profile.validate().is_err());

        profile.endpoints.claim_intimation = Some("ftp://files.example.com/claims".into());
        let err = profile.validate().unwrap_err();
        assert!(err.contains("http(s)"));
    }

    #[test]
    fn test_mapping_rejects_unknown_canonical_field() {
        let mut m = mapping();
        assert!(m.validate().is_ok());
        m.columns
            .insert("latitude".to_string(), "lat".to_string());
        let err = m.validate().unwrap_err();
        assert!(err.contains("latitude"));
    }

    #[test]
    fn test_mapping_lookup() {
        let m = mapping();
        assert_eq!(m.column_for("hospital_name"), Some("Name"));
        assert_eq!(m.column_for("phone"), None);
    }
}
