//! Error types for the DDNS reconciler
//!
//! Every variant except [`Error::IpSource`] is terminal for the current
//! reconciliation pass. A single IP service failing is only reported as
//! `IpSource`, and the discoverer moves on to the next service.

use std::fmt;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Provider-facing stage of a reconciliation pass
///
/// Attached to provider errors so the operator can tell a failed lookup
/// from a failed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Listing the record by zone, name and type
    FetchRecord,
    /// Republishing the record with the new content
    UpdateRecord,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::FetchRecord => f.write_str("fetch record"),
            Stage::UpdateRecord => f.write_str("update record"),
        }
    }
}

/// Core error type for the DDNS reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing or invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single IP service failed or returned unusable data
    #[error("IP source error ({service}): {message}")]
    IpSource {
        /// URL or name of the service
        service: String,
        /// What went wrong
        message: String,
    },

    /// Every configured IP service failed
    #[error("unable to discover IPv4 address from {attempted} configured service(s)")]
    DiscoveryExhausted {
        /// Number of services that were tried
        attempted: usize,
    },

    /// No record matched the configured zone, name and type
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Transport or HTTP status failure talking to the provider
    #[error("{stage} request failed ({provider}): {message}")]
    ProviderRequest {
        /// Provider name
        provider: String,
        /// Stage that failed
        stage: Stage,
        /// Error message
        message: String,
    },

    /// The provider answered but flagged the request as failed
    #[error("{stage} rejected by {provider}: {message}")]
    ProviderRejected {
        /// Provider name
        provider: String,
        /// Stage that failed
        stage: Stage,
        /// Provider error payload
        message: String,
    },

    /// The provider's response body could not be decoded
    #[error("failed to decode {stage} response ({provider}): {message}")]
    Decode {
        /// Provider name
        provider: String,
        /// Stage that failed
        stage: Stage,
        /// Decoder error
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP source error for one service
    pub fn ip_source(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IpSource {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider request (transport/status) error
    pub fn provider_request(
        provider: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderRequest {
            provider: provider.into(),
            stage,
            message: message.into(),
        }
    }

    /// Create a provider rejection error
    pub fn provider_rejected(
        provider: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderRejected {
            provider: provider.into(),
            stage,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(provider: impl Into<String>, stage: Stage, message: impl Into<String>) -> Self {
        Self::Decode {
            provider: provider.into(),
            stage,
            message: message.into(),
        }
    }

    /// The provider stage this error belongs to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::ProviderRequest { stage, .. }
            | Self::ProviderRejected { stage, .. }
            | Self::Decode { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Whether this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_stage() {
        let err = Error::provider_rejected("cloudflare", Stage::FetchRecord, "[9109: Invalid access token]");
        assert_eq!(
            err.to_string(),
            "fetch record rejected by cloudflare: [9109: Invalid access token]"
        );
        assert_eq!(err.stage(), Some(Stage::FetchRecord));
    }

    #[test]
    fn test_discovery_exhausted_names_no_service() {
        let err = Error::DiscoveryExhausted { attempted: 3 };
        let text = err.to_string();
        assert!(text.contains("3 configured service(s)"));
        assert!(!text.contains("http"));
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn test_is_config() {
        assert!(Error::config("CF_AUTH_KEY is required").is_config());
        assert!(!Error::not_found("example.com").is_config());
    }
}
