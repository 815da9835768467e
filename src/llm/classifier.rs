// Shadow-Instructor: Failure Classifier
// Decides whether a primary-provider failure may be retried on the fallback provider.
//
// This is a best-effort heuristic over the provider's error text, not a
// structured error code. Provider wording changes can shift results; all call
// sites go through `classify` so it can be hardened in one place.

use crate::error::ProviderError;
use serde::{Deserialize, Serialize};

const RATE_LIMIT_TOKENS: [&str; 4] = ["429", "resource_exhausted", "quota", "rate"];
const REGION_TOKENS: [&str; 2] = ["location", "precondition"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FailureClass {
    /// Throttling or quota exhaustion
    RetryableRateLimit,
    /// Request rejected for deployment-region / precondition reasons
    RetryableRegion,
    Fatal,
}

impl FailureClass {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FailureClass::Fatal)
    }
}

/// Classify a provider failure by inspecting its status and message
pub fn classify(error: &ProviderError) -> FailureClass {
    classify_message(&error.to_string())
}

/// Same rules over raw text
pub fn classify_message(message: &str) -> FailureClass {
    let text = message.to_lowercase();

    if RATE_LIMIT_TOKENS.iter().any(|t| text.contains(t)) {
        return FailureClass::RetryableRateLimit;
    }

    if text.contains("400") && REGION_TOKENS.iter().any(|t| text.contains(t)) {
        return FailureClass::RetryableRegion;
    }

    FailureClass::Fatal
}
