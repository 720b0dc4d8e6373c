//! Provider registry and deployment configuration for TPABridge.
//!
//! The registry is the static, process-wide catalog of every supported
//! TPA/insurer: identity, authentication scheme, endpoint URLs, retry
//! policy and, for hospital search, the column mapping of the provider's
//! backing table. Profiles are immutable and loaded once at process start.
//!
//! Endpoint URLs, credentials, retry counts and table mappings encode
//! environment- and contract-specific values that differ between test and
//! production, so they are never compiled into request-builder logic; they
//! arrive here from a TOML file with `TPABRIDGE__...` environment-variable
//! overrides.

pub mod defaults;
pub mod loader;
pub mod profile;
pub mod registry;

pub use defaults::default_profiles;
pub use loader::{GatewaySettings, RegistryConfig, load_registry};
pub use profile::{
    CANONICAL_HOSPITAL_FIELDS, Endpoints, HospitalTableMapping, ProviderCredentials,
    ProviderProfile,
};
pub use registry::ProviderRegistry;

use tpabridge_core::ProviderId;

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Duplicate provider id {0} in registry")]
    DuplicateProvider(ProviderId),
}

impl ConfigError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
