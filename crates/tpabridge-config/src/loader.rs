//! Registry file loading.
//!
//! A deployment supplies a TOML file with `[gateway]` settings and one
//! `[[provider]]` block per profile. Any value can be overridden through
//! the environment, e.g. `TPABRIDGE__GATEWAY__DEFAULT_TIMEOUT_MS=5000`.

use std::collections::HashSet;
use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::ProviderProfile;
use crate::registry::ProviderRegistry;
use crate::{ConfigError, Result};

/// Gateway-wide settings that are not provider-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Fallback outbound timeout for providers that do not set their own,
    /// in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    /// Value sent in the `User-Agent` header on outbound calls.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    "tpabridge/0.1".into()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Parsed registry file: gateway settings plus the provider roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default, rename = "provider")]
    pub providers: Vec<ProviderProfile>,
}

impl RegistryConfig {
    /// The built-in roster with default gateway settings; what a
    /// deployment gets before it supplies a registry file.
    pub fn with_default_roster() -> Self {
        Self {
            gateway: GatewaySettings::default(),
            providers: crate::defaults::default_profiles(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.gateway.default_timeout_ms == 0 {
            return Err(ConfigError::validation(
                "gateway.default_timeout_ms must be > 0",
            ));
        }
        let mut seen = HashSet::new();
        for profile in &self.providers {
            profile.validate().map_err(ConfigError::validation)?;
            if !seen.insert(profile.id) {
                return Err(ConfigError::DuplicateProvider(profile.id));
            }
        }
        Ok(())
    }

    /// Consume the parsed file into an immutable registry.
    pub fn into_registry(self) -> Result<ProviderRegistry> {
        ProviderRegistry::new(self.providers)
    }
}

/// Load and validate the registry configuration.
///
/// Sources, in priority order: `TPABRIDGE__...` environment variables,
/// then the TOML file at `path` (or `tpabridge.toml` in the working
/// directory when `path` is `None` and that file exists).
pub fn load_registry(path: Option<&str>) -> Result<RegistryConfig> {
    let mut builder = Config::builder();

    match path {
        Some(p) => {
            let pathbuf = PathBuf::from(p);
            if !pathbuf.exists() {
                return Err(ConfigError::validation(format!(
                    "registry file not found: {p}"
                )));
            }
            builder = builder.add_source(File::from(pathbuf));
        }
        None => {
            let default_path = PathBuf::from("tpabridge.toml");
            if default_path.exists() {
                debug!("loading registry from ./tpabridge.toml");
                builder = builder.add_source(File::from(default_path));
            }
        }
    }

    // Environment variable overrides, e.g. TPABRIDGE__GATEWAY__USER_AGENT
    builder = builder.add_source(Environment::with_prefix("TPABRIDGE").separator("__"));

    let cfg = builder
        .build()
        .map_err(|e| ConfigError::parse(e.to_string()))?;
    let registry: RegistryConfig = cfg
        .try_deserialize()
        .map_err(|e| ConfigError::parse(e.to_string()))?;

    registry.validate()?;
    debug!(
        providers = registry.providers.len(),
        "registry configuration loaded"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE: &str = r#"
[gateway]
default_timeout_ms = 10000
user_agent = "tpabridge-test/0"

[[provider]]
id = 1
name = "Medserve Health TPA"
auth = "oauth2_password"
request_timeout_ms = 8000

[provider.endpoints]
claim_intimation = "https://uat.medserve.example.com/api/claim/intimate"
token = "https://uat.medserve.example.com/oauth/token"

[provider.credentials]
username = "svc"
password = "secret"

[provider.retry]
max_attempts = 3
inter_attempt_delay_ms = 100

[[provider]]
id = 5
name = "Horizon General Insurance"

[provider.hospital_table]
table = "horizon_ppn"

[provider.hospital_table.columns]
hospital_name = "Name"
address_line_1 = "address"
city = "city"
state = "state"
pincode = "pincode"
"#;

    #[test]
    fn test_parse_sample_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("tpabridge.toml");
        fs::write(&path, SAMPLE).expect("write toml");

        let cfg = load_registry(path.to_str()).expect("should parse registry");
        assert_eq!(cfg.gateway.default_timeout_ms, 10_000);
        assert_eq!(cfg.providers.len(), 2);

        let medserve = &cfg.providers[0];
        assert_eq!(medserve.name, "Medserve Health TPA");
        assert_eq!(medserve.retry.max_attempts, 3);
        assert_eq!(
            medserve.endpoints.token.as_deref(),
            Some("https://uat.medserve.example.com/oauth/token")
        );

        let horizon = &cfg.providers[1];
        let mapping = horizon.hospital_table.as_ref().unwrap();
        assert_eq!(mapping.column_for("hospital_name"), Some("Name"));
        assert_eq!(mapping.column_for("phone"), None);
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("bad.toml");
        // oauth2_password without token endpoint or credentials
        fs::write(
            &path,
            r#"
[[provider]]
id = 1
name = "Medserve Health TPA"
auth = "oauth2_password"
"#,
        )
        .expect("write toml");

        let err = load_registry(path.to_str()).expect_err("expected validation error");
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_duplicate_provider_ids_rejected() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("dup.toml");
        fs::write(
            &path,
            r#"
[[provider]]
id = 2
name = "CarePlus Assist"

[[provider]]
id = 2
name = "CarePlus Assist (copy)"
"#,
        )
        .expect("write toml");

        let err = load_registry(path.to_str()).expect_err("expected duplicate error");
        assert!(matches!(err, ConfigError::DuplicateProvider(_)));
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let err = load_registry(Some("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_default_roster_validates() {
        let cfg = RegistryConfig::with_default_roster();
        assert!(cfg.validate().is_ok());
        let registry = cfg.into_registry().unwrap();
        assert_eq!(registry.len(), 13);
    }
}
