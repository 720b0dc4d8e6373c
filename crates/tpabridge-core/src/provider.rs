use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Stable identifier of an integrated TPA/insurer.
///
/// Policy records carry this id; every id referenced by a policy must
/// resolve to exactly one profile in the provider registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProviderId(pub u16);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProviderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u16>().map(ProviderId)
    }
}

impl From<u16> for ProviderId {
    fn from(id: u16) -> Self {
        ProviderId(id)
    }
}

/// How a provider authenticates gateway requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// No authentication at all.
    #[default]
    None,
    /// A constant shared-secret header taken from the profile.
    StaticHeader,
    /// OAuth2 password grant against the provider's token endpoint.
    Oauth2Password,
    /// Per-request HMAC-SHA256 signature over the target URL.
    HmacSigned,
    /// Upstream-issued session token, symmetrically encrypted before use.
    EncryptedSession,
}

impl AuthScheme {
    /// Whether obtaining a credential for this scheme involves a network
    /// call to the provider.
    pub fn requires_token_endpoint(&self) -> bool {
        matches!(self, Self::Oauth2Password | Self::EncryptedSession)
    }
}

/// Per-provider retry tolerance.
///
/// Attempts are sequential. No integrated provider wants exponential
/// backoff; a small fixed delay between attempts avoids hammering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first one. Range 1-10.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u8,
    /// Fixed delay between attempts, in milliseconds.
    #[serde(default = "default_inter_attempt_delay_ms")]
    pub inter_attempt_delay_ms: u64,
}

fn default_max_attempts() -> u8 {
    3
}

fn default_inter_attempt_delay_ms() -> u64 {
    500
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            inter_attempt_delay_ms: default_inter_attempt_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and the default delay.
    pub fn with_max_attempts(max_attempts: u8) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// The inter-attempt delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.inter_attempt_delay_ms)
    }

    /// Bounds check. Registry validation calls this once at load time.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(format!(
                "retry.max_attempts must be between 1 and 10, got {}",
                self.max_attempts
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_display_and_parse() {
        let id = ProviderId(4);
        assert_eq!(id.to_string(), "4");
        assert_eq!("4".parse::<ProviderId>().unwrap(), id);
        assert_eq!(" 12 ".parse::<ProviderId>().unwrap(), ProviderId(12));
        assert!("tpa".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_auth_scheme_serde_names() {
        let json = serde_json::to_string(&AuthScheme::Oauth2Password).unwrap();
        assert_eq!(json, "\"oauth2_password\"");
        let scheme: AuthScheme = serde_json::from_str("\"encrypted_session\"").unwrap();
        assert_eq!(scheme, AuthScheme::EncryptedSession);
        let scheme: AuthScheme = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(scheme, AuthScheme::None);
    }

    #[test]
    fn test_token_endpoint_requirement() {
        assert!(AuthScheme::Oauth2Password.requires_token_endpoint());
        assert!(AuthScheme::EncryptedSession.requires_token_endpoint());
        assert!(!AuthScheme::None.requires_token_endpoint());
        assert!(!AuthScheme::StaticHeader.requires_token_endpoint());
        assert!(!AuthScheme::HmacSigned.requires_token_endpoint());
    }

    #[test]
    fn test_retry_policy_bounds() {
        assert!(RetryPolicy::default().validate().is_ok());
        assert!(RetryPolicy::with_max_attempts(10).validate().is_ok());
        assert!(RetryPolicy::with_max_attempts(0).validate().is_err());
        assert!(RetryPolicy::with_max_attempts(11).validate().is_err());
    }

    #[test]
    fn test_retry_policy_delay() {
        let policy = RetryPolicy {
            max_attempts: 5,
            inter_attempt_delay_ms: 250,
        };
        assert_eq!(policy.delay(), Duration::from_millis(250));
    }
}
