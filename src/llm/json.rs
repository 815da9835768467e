// Shadow-Instructor: JSON extraction from model text
// The fallback provider has no schema enforcement, so replies may arrive
// wrapped in markdown fences or surrounded by prose.

use crate::error::CoreError;
use crate::schema::StructuredOutput;

/// Extract the JSON object from a response that might be wrapped in markdown code blocks
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return trimmed;
    }

    // Fenced block, with or without a language tag
    if let Some(start) = trimmed.find("```") {
        let after_fence = start + 3;
        let content_start = trimmed[after_fence..]
            .find('\n')
            .map(|i| after_fence + i + 1)
            .unwrap_or(after_fence);
        if let Some(end) = trimmed[content_start..].find("```") {
            return trimmed[content_start..content_start + end].trim();
        }
    }

    // Raw object embedded in prose
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return &trimmed[start..=end];
        }
    }

    trimmed
}

/// Extract, parse and validate a structured reply
pub fn parse_structured<T: StructuredOutput>(response: &str) -> Result<T, CoreError> {
    if response.trim().is_empty() {
        return Err(CoreError::validation(format!("empty response for {}", T::NAME)));
    }
    T::from_json_str(extract_json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AlertStatus, PacingAlert};

    #[test]
    fn test_plain_object_passes_through() {
        assert_eq!(extract_json(r#"  {"status":"ok"} "#), r#"{"status":"ok"}"#);
    }

    #[test]
    fn test_fenced_block() {
        let text = "Here you go:\n```json\n{\"status\":\"alert\",\"message\":\"Stop rambling\"}\n```\n";
        let alert: PacingAlert = parse_structured(text).unwrap();
        assert_eq!(alert.status, AlertStatus::Alert);
        assert_eq!(alert.message.as_deref(), Some("Stop rambling"));
    }

    #[test]
    fn test_object_in_prose() {
        let text = "Sure! {\"status\":\"ok\"} Hope that helps.";
        assert_eq!(extract_json(text), r#"{"status":"ok"}"#);
    }

    #[test]
    fn test_shape_mismatch_is_validation_error() {
        let result: Result<PacingAlert, _> = parse_structured(r#"{"verdict":"fine"}"#);
        assert!(matches!(result, Err(CoreError::Validation(_))));

        let result: Result<PacingAlert, _> = parse_structured("   ");
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
