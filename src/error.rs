// Shadow-Instructor: Error Taxonomy
// One error type for every agent call path, plus the raw provider failure it wraps.

use std::fmt;

/// A failure raised by a single provider call, before any classification.
///
/// `status` is the HTTP status when the provider answered at all; `message`
/// carries the provider's own error text, which the failure classifier reads.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{provider} error{}: {message}", status_suffix(.status))]
pub struct ProviderError {
    pub provider: String,
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            status,
            message: message.into(),
        }
    }

    /// Transport-level failure (connect, timeout, body read)
    pub fn transport(provider: &str, err: impl fmt::Display) -> Self {
        Self::new(provider, None, format!("transport failure: {}", err))
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

/// Errors surfaced by the core to its callers
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Required credentials or keys are absent or unusable. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Primary provider throttled the request and no fallback was available
    #[error("Rate limited: {0}")]
    RateLimited(ProviderError),

    /// Primary provider rejected the request for region/precondition reasons
    /// and no fallback was available
    #[error("Region unavailable: {0}")]
    RegionUnavailable(ProviderError),

    /// Provider output did not parse as JSON or broke the target schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other primary failure, propagated unchanged
    #[error(transparent)]
    Provider(ProviderError),

    /// The one fallback attempt also failed
    #[error("Fallback failed after primary error ({primary}): {fallback}")]
    FallbackFailed {
        primary: ProviderError,
        fallback: Box<CoreError>,
    },

    /// A prompt template could not be rendered
    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    /// The originating provider error, if this error came from a provider call
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            CoreError::RateLimited(e)
            | CoreError::RegionUnavailable(e)
            | CoreError::Provider(e) => Some(e),
            CoreError::FallbackFailed { primary, .. } => Some(primary),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Validation(format!("invalid JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display_includes_status() {
        let err = ProviderError::new("gemini", Some(429), "RESOURCE_EXHAUSTED");
        assert_eq!(err.to_string(), "gemini error (429): RESOURCE_EXHAUSTED");

        let err = ProviderError::new("groq", None, "no choices");
        assert_eq!(err.to_string(), "groq error: no choices");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_provider_passthrough_is_transparent() {
        let inner = ProviderError::new("gemini", Some(500), "internal");
        let err = CoreError::Provider(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.provider_error(), Some(&inner));
    }
}
