// Shadow-Instructor: Deep interview analysis report

use super::{array_of, check_range, count, integer, object, string, string_enum, StructuredOutput};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Pace {
    #[serde(rename = "Too Fast")]
    TooFast,
    Good,
    #[serde(rename = "Too Slow")]
    TooSlow,
}

impl Pace {
    pub const VALUES: [&'static str; 3] = ["Too Fast", "Good", "Too Slow"];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum StammeringFrequency {
    None,
    Low,
    Moderate,
    High,
}

impl StammeringFrequency {
    pub const VALUES: [&'static str; 4] = ["None", "Low", "Moderate", "High"];
}

/// Hiring recommendation. Serialized as exactly one of the four fixed strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    #[serde(rename = "Strong Hire")]
    StrongHire,
    Hire,
    #[serde(rename = "Weak Hire")]
    WeakHire,
    #[serde(rename = "No Hire")]
    NoHire,
}

impl Verdict {
    pub const VALUES: [&'static str; 4] = ["Strong Hire", "Hire", "Weak Hire", "No Hire"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::StrongHire => "Strong Hire",
            Verdict::Hire => "Hire",
            Verdict::WeakHire => "Weak Hire",
            Verdict::NoHire => "No Hire",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechAnalysis {
    pub pace: Pace,
    pub clarity: u8,
    pub conciseness: u8,
    pub stammering_frequency: StammeringFrequency,
    /// Uh, um, like
    pub filled_pauses_count: u32,
    pub long_pauses_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentAnalysis {
    pub technical_accuracy: u8,
    pub relevance: u8,
    pub problem_solving_skills: u8,
    pub key_strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionFeedback {
    pub question_text: String,
    pub user_response_summary: String,
    pub score: u8,
    pub feedback: String,
    pub better_response_suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewAnalysisReport {
    pub overall_score: u8,
    pub summary: String,
    pub speech_analysis: SpeechAnalysis,
    pub content_analysis: ContentAnalysis,
    pub question_breakdown: Vec<QuestionFeedback>,
    pub actionable_tips: Vec<String>,
    pub final_verdict: Verdict,
}

impl StructuredOutput for InterviewAnalysisReport {
    const NAME: &'static str = "InterviewAnalysisReport";

    fn response_schema() -> Value {
        let speech = object(
            &[
                ("pace", string_enum(&Pace::VALUES)),
                ("clarity", integer(0, 100)),
                ("conciseness", integer(0, 100)),
                ("stammering_frequency", string_enum(&StammeringFrequency::VALUES)),
                ("filled_pauses_count", count()),
                ("long_pauses_count", count()),
            ],
            &[
                "pace",
                "clarity",
                "conciseness",
                "stammering_frequency",
                "filled_pauses_count",
                "long_pauses_count",
            ],
        );
        let content = object(
            &[
                ("technical_accuracy", integer(0, 100)),
                ("relevance", integer(0, 100)),
                ("problem_solving_skills", integer(0, 100)),
                ("key_strengths", array_of(string())),
                ("areas_for_improvement", array_of(string())),
            ],
            &[
                "technical_accuracy",
                "relevance",
                "problem_solving_skills",
                "key_strengths",
                "areas_for_improvement",
            ],
        );
        let question = object(
            &[
                ("question_text", string()),
                ("user_response_summary", string()),
                ("score", integer(0, 100)),
                ("feedback", string()),
                ("better_response_suggestion", string()),
            ],
            &[
                "question_text",
                "user_response_summary",
                "score",
                "feedback",
                "better_response_suggestion",
            ],
        );

        object(
            &[
                ("overall_score", integer(0, 100)),
                ("summary", string()),
                ("speech_analysis", speech),
                ("content_analysis", content),
                ("question_breakdown", array_of(question)),
                ("actionable_tips", array_of(string())),
                ("final_verdict", string_enum(&Verdict::VALUES)),
            ],
            &[
                "overall_score",
                "summary",
                "speech_analysis",
                "content_analysis",
                "question_breakdown",
                "actionable_tips",
                "final_verdict",
            ],
        )
    }

    fn validate(&self) -> Result<(), CoreError> {
        check_range("overall_score", self.overall_score.into(), 0, 100)?;

        let speech = &self.speech_analysis;
        check_range("speech_analysis.clarity", speech.clarity.into(), 0, 100)?;
        check_range("speech_analysis.conciseness", speech.conciseness.into(), 0, 100)?;

        let content = &self.content_analysis;
        check_range("content_analysis.technical_accuracy", content.technical_accuracy.into(), 0, 100)?;
        check_range("content_analysis.relevance", content.relevance.into(), 0, 100)?;
        check_range(
            "content_analysis.problem_solving_skills",
            content.problem_solving_skills.into(),
            0,
            100,
        )?;

        for (i, q) in self.question_breakdown.iter().enumerate() {
            check_range(&format!("question_breakdown[{}].score", i), q.score.into(), 0, 100)?;
        }

        if self.summary.trim().is_empty() {
            return Err(CoreError::validation("summary is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "overall_score": 34,
            "summary": "Hesitant answer with no supporting detail.",
            "speech_analysis": {
                "pace": "Too Slow",
                "clarity": 40,
                "conciseness": 70,
                "stammering_frequency": "Moderate",
                "filled_pauses_count": 2,
                "long_pauses_count": 0
            },
            "content_analysis": {
                "technical_accuracy": 15,
                "relevance": 40,
                "problem_solving_skills": 10,
                "key_strengths": [],
                "areas_for_improvement": ["Explain why a hash map fits"]
            },
            "question_breakdown": [{
                "question_text": "How would you store the mappings?",
                "user_response_summary": "Guessed a hash map.",
                "score": 15,
                "feedback": "No justification given.",
                "better_response_suggestion": "Discuss key-value lookups and persistence."
            }],
            "actionable_tips": ["Commit to an answer and justify it"],
            "final_verdict": "No Hire"
        }"#
    }

    #[test]
    fn test_parse_and_round_trip() {
        let report = InterviewAnalysisReport::from_json_str(sample_json()).unwrap();
        assert_eq!(report.final_verdict, Verdict::NoHire);
        assert_eq!(report.speech_analysis.pace, Pace::TooSlow);

        let encoded = serde_json::to_string(&report).unwrap();
        let decoded: InterviewAnalysisReport = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, report);
        assert!(encoded.contains(r#""final_verdict":"No Hire""#));
    }

    #[test]
    fn test_verdict_with_reasoning_is_rejected() {
        let bad = sample_json().replace(r#""No Hire""#, r#""No Hire - lacks depth""#);
        assert!(matches!(
            InterviewAnalysisReport::from_json_str(&bad),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_out_of_range_score_is_rejected() {
        let bad = sample_json().replace(r#""technical_accuracy": 15"#, r#""technical_accuracy": 150"#);
        let err = InterviewAnalysisReport::from_json_str(&bad).unwrap_err();
        assert!(err.to_string().contains("technical_accuracy"));

        let negative = sample_json().replace(r#""overall_score": 34"#, r#""overall_score": -3"#);
        assert!(InterviewAnalysisReport::from_json_str(&negative).is_err());
    }

    #[test]
    fn test_missing_section_is_rejected() {
        let mut value: Value = serde_json::from_str(sample_json()).unwrap();
        value.as_object_mut().unwrap().remove("speech_analysis");
        assert!(InterviewAnalysisReport::from_json_str(&value.to_string()).is_err());
    }

    #[test]
    fn test_schema_lists_enum_values_verbatim() {
        let schema = InterviewAnalysisReport::response_schema();
        assert_eq!(
            schema["properties"]["final_verdict"]["enum"],
            serde_json::json!(["Strong Hire", "Hire", "Weak Hire", "No Hire"])
        );
        assert_eq!(
            schema["properties"]["speech_analysis"]["properties"]["stammering_frequency"]["enum"][3],
            "High"
        );
    }
}
