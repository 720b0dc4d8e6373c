use thiserror::Error;

use crate::provider::ProviderId;

/// Error taxonomy for gateway operations.
///
/// Every failure a caller can observe maps onto exactly one of these
/// variants. The dispatch engine catches all of them at its boundary and
/// converts them into `success = false` results with a readable message;
/// no transport error type crosses into caller code.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The provider id is not present in the registry. Never retried.
    #[error("No provider profile configured for provider {0}")]
    ConfigurationMissing(ProviderId),

    /// The provider exists but does not support the requested operation.
    /// Returned immediately, without any network call.
    #[error("Provider {provider} does not support {operation}")]
    UnsupportedOperation {
        provider: ProviderId,
        operation: &'static str,
    },

    /// Credential acquisition failed: the token/signature endpoint was
    /// unreachable or rejected the request.
    #[error("Authentication with provider {provider} failed: {message}")]
    AuthenticationFailure {
        provider: ProviderId,
        message: String,
    },

    /// Connection failure or timeout talking to the provider.
    #[error("Could not reach provider {provider}: {message}")]
    TransientNetwork {
        provider: ProviderId,
        message: String,
    },

    /// A well-formed response indicating a business failure, e.g. an
    /// invalid policy or member. Not retried.
    #[error("Provider {provider} rejected the request: {message}")]
    ProviderRejected {
        provider: ProviderId,
        message: String,
    },

    /// The response matched none of the known normalization paths.
    #[error("Unrecognized response from provider {provider}: {message}")]
    UnexpectedResponse {
        provider: ProviderId,
        message: String,
    },

    /// No e-card resolution path succeeded within the retry budget.
    #[error("E-card document is not available: {0}")]
    DocumentNotAvailable(String),

    /// The caller supplied an incomplete request. Never retried.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A gateway-side fault that is not attributable to any provider.
    #[error("Internal gateway error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Create a new AuthenticationFailure error
    pub fn authentication(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::AuthenticationFailure {
            provider,
            message: message.into(),
        }
    }

    /// Create a new TransientNetwork error
    pub fn network(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::TransientNetwork {
            provider,
            message: message.into(),
        }
    }

    /// Create a new ProviderRejected error
    pub fn rejected(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::ProviderRejected {
            provider,
            message: message.into(),
        }
    }

    /// Create a new UnexpectedResponse error
    pub fn unexpected(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            provider,
            message: message.into(),
        }
    }

    /// Create a new Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the dispatch engine may re-attempt the full call cycle
    /// after this failure.
    ///
    /// Business rejections are final: where a provider's envelope
    /// distinguishes a refusal from a transport fault, repeating the call
    /// cannot change the answer. Ambiguous failures stay retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailure { .. }
                | Self::TransientNetwork { .. }
                | Self::UnexpectedResponse { .. }
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationMissing(_) | Self::UnsupportedOperation { .. } => {
                ErrorCategory::Configuration
            }
            Self::AuthenticationFailure { .. } => ErrorCategory::Authentication,
            Self::TransientNetwork { .. } => ErrorCategory::Network,
            Self::ProviderRejected { .. } => ErrorCategory::Provider,
            Self::UnexpectedResponse { .. } => ErrorCategory::Response,
            Self::DocumentNotAvailable(_) => ErrorCategory::Document,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Network,
    Provider,
    Response,
    Document,
    Validation,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Authentication => write!(f, "authentication"),
            Self::Network => write!(f, "network"),
            Self::Provider => write!(f, "provider"),
            Self::Response => write!(f, "response"),
            Self::Document => write!(f, "document"),
            Self::Validation => write!(f, "validation"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
