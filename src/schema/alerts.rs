// Shadow-Instructor: Live coaching shapes (instructor critique, shadow alerts)

use super::{array_of, check_range, integer, nullable_string, object, string, string_enum, StructuredOutput};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured critique of the candidate's latest answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoachingFeedback {
    pub score: u8,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub improvement_tip: String,
}

impl StructuredOutput for CoachingFeedback {
    const NAME: &'static str = "CoachingFeedback";

    fn response_schema() -> Value {
        object(
            &[
                ("score", integer(0, 100)),
                ("pros", array_of(string())),
                ("cons", array_of(string())),
                ("improvement_tip", string()),
            ],
            &["score", "pros", "cons", "improvement_tip"],
        )
    }

    fn validate(&self) -> Result<(), CoreError> {
        check_range("score", self.score.into(), 0, 100)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Ok,
    Alert,
    Error,
}

impl AlertStatus {
    pub const VALUES: [&'static str; 3] = ["ok", "alert", "error"];
}

/// Non-verbal judgment of a single webcam frame.
/// `message: None` means "no issue" and is distinct from `Some("")`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisionAlert {
    pub status: AlertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl VisionAlert {
    pub fn ok() -> Self {
        Self {
            status: AlertStatus::Ok,
            message: None,
            confidence: None,
        }
    }

    /// Degraded value for an unrecoverable analysis cycle
    pub fn error() -> Self {
        Self {
            status: AlertStatus::Error,
            message: None,
            confidence: None,
        }
    }

    pub fn is_alert(&self) -> bool {
        self.status == AlertStatus::Alert
    }
}

impl StructuredOutput for VisionAlert {
    const NAME: &'static str = "VisionAlert";

    fn response_schema() -> Value {
        object(
            &[
                ("status", string_enum(&AlertStatus::VALUES)),
                ("message", nullable_string()),
                ("confidence", json!({ "type": "NUMBER", "minimum": 0, "maximum": 1 })),
            ],
            &["status"],
        )
    }

    fn validate(&self) -> Result<(), CoreError> {
        if let Some(confidence) = self.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(CoreError::validation(format!(
                    "confidence = {} is outside [0, 1]",
                    confidence
                )));
            }
        }
        Ok(())
    }
}

/// Rambling/pacing judgment of a rolling transcript chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PacingAlert {
    pub status: AlertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PacingAlert {
    pub fn ok() -> Self {
        Self {
            status: AlertStatus::Ok,
            message: None,
        }
    }

    pub fn error() -> Self {
        Self {
            status: AlertStatus::Error,
            message: None,
        }
    }

    pub fn is_alert(&self) -> bool {
        self.status == AlertStatus::Alert
    }
}

impl StructuredOutput for PacingAlert {
    const NAME: &'static str = "PacingAlert";

    fn response_schema() -> Value {
        object(
            &[
                ("status", string_enum(&AlertStatus::VALUES)),
                ("message", nullable_string()),
            ],
            &["status"],
        )
    }

    fn validate(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
