// Shadow-Instructor: Resume visual critique

use super::{array_of, check_range, integer, object, string, StructuredOutput};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the critique was produced: from the rendered PDF, or from extracted text on fallback
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    #[default]
    Visual,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeIssue {
    pub category: String,
    pub description: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeCritique {
    /// 1-10
    pub score: u8,
    pub summary: String,
    pub issues: Vec<ResumeIssue>,
    pub strengths: Vec<String>,
    /// Stamped by the core after the call; the model never supplies it
    #[serde(default)]
    pub analysis_mode: AnalysisMode,
}

impl StructuredOutput for ResumeCritique {
    const NAME: &'static str = "ResumeCritique";

    fn response_schema() -> Value {
        let issue = object(
            &[
                ("category", string()),
                ("description", string()),
                ("suggestion", string()),
            ],
            &["category", "description", "suggestion"],
        );
        object(
            &[
                ("score", integer(1, 10)),
                ("summary", string()),
                ("issues", array_of(issue)),
                ("strengths", array_of(string())),
            ],
            &["score", "summary", "issues", "strengths"],
        )
    }

    fn validate(&self) -> Result<(), CoreError> {
        check_range("score", self.score.into(), 1, 10)?;
        if self.summary.trim().is_empty() {
            return Err(CoreError::validation("summary is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults_to_visual_and_score_is_bounded() {
        let critique = ResumeCritique::from_json_str(
            r#"{"score":7,"summary":"Clean layout.","issues":[],"strengths":["Consistent fonts"]}"#,
        )
        .unwrap();
        assert_eq!(critique.analysis_mode, AnalysisMode::Visual);

        let zero = r#"{"score":0,"summary":"x","issues":[],"strengths":[]}"#;
        assert!(ResumeCritique::from_json_str(zero).is_err());
    }
}
