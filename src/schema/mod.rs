// Shadow-Instructor: Structured Report Schema
// Provider-agnostic result shapes. Both providers' output is validated against these.

pub mod alerts;
pub mod report;
pub mod resume;
pub mod transcript;

pub use alerts::{AlertStatus, CoachingFeedback, PacingAlert, VisionAlert};
pub use report::{
    ContentAnalysis, InterviewAnalysisReport, Pace, QuestionFeedback, SpeechAnalysis,
    StammeringFrequency, Verdict,
};
pub use resume::{AnalysisMode, ResumeCritique, ResumeIssue};
pub use transcript::{
    format_transcript, ConversationMessage, Difficulty, InterviewContext, Persona, Scenario,
    Speaker,
};

use crate::error::CoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// A response shape that can be requested natively from the primary provider
/// and checked after parsing from either provider.
pub trait StructuredOutput: Serialize + DeserializeOwned + Send + 'static {
    /// Schema name used in prompts and logs
    const NAME: &'static str;

    /// Gemini `responseSchema` (OpenAPI subset)
    fn response_schema() -> Value;

    /// Range and content checks serde cannot express
    fn validate(&self) -> Result<(), CoreError>;

    /// Parse and validate in one step
    fn from_json_str(text: &str) -> Result<Self, CoreError> {
        let value: Self = serde_json::from_str(text.trim()).map_err(|e| {
            CoreError::validation(format!("{} does not match schema: {}", Self::NAME, e))
        })?;
        value.validate()?;
        Ok(value)
    }
}

pub(crate) fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), CoreError> {
    if value < min || value > max {
        return Err(CoreError::validation(format!(
            "{} = {} is outside [{}, {}]",
            field, value, min, max
        )));
    }
    Ok(())
}

// Schema builders. Types are upper-case per the Gemini REST `Type` enum.

pub(crate) fn object(properties: &[(&str, Value)], required: &[&str]) -> Value {
    let mut props = Map::new();
    for (name, schema) in properties {
        props.insert((*name).to_string(), schema.clone());
    }
    json!({
        "type": "OBJECT",
        "properties": props,
        "required": required,
        "propertyOrdering": properties.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
    })
}

pub(crate) fn string() -> Value {
    json!({ "type": "STRING" })
}

pub(crate) fn nullable_string() -> Value {
    json!({ "type": "STRING", "nullable": true })
}

pub(crate) fn string_enum(values: &[&str]) -> Value {
    json!({ "type": "STRING", "enum": values })
}

pub(crate) fn integer(min: u32, max: u32) -> Value {
    json!({ "type": "INTEGER", "minimum": min, "maximum": max })
}

pub(crate) fn count() -> Value {
    json!({ "type": "INTEGER", "minimum": 0 })
}

pub(crate) fn array_of(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_builder_keeps_ordering() {
        let schema = object(&[("b", string()), ("a", integer(0, 100))], &["a", "b"]);
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["propertyOrdering"], json!(["b", "a"]));
        assert_eq!(schema["properties"]["a"]["maximum"], 100);
    }

    #[test]
    fn test_check_range() {
        assert!(check_range("score", 100, 0, 100).is_ok());
        assert!(check_range("score", 0, 0, 100).is_ok());
        let err = check_range("score", 101, 0, 100).unwrap_err();
        assert!(err.to_string().contains("score = 101"));
    }
}
