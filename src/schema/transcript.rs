// Shadow-Instructor: Transcript and per-request interview context

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The human candidate
    User,
    Interviewer,
    Instructor,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Interviewer => "interviewer",
            Speaker::Instructor => "instructor",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript entry. Owned by the session layer; the core only reads slices of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    pub role: Speaker,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl ConversationMessage {
    pub fn new(role: Speaker, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            timestamp: None,
        }
    }

    pub fn user(content: &str) -> Self {
        Self::new(Speaker::User, content)
    }

    pub fn interviewer(content: &str) -> Self {
        Self::new(Speaker::Interviewer, content)
    }

    pub fn instructor(content: &str) -> Self {
        Self::new(Speaker::Instructor, content)
    }
}

/// Render a transcript as `[ROLE]: content` lines
pub fn format_transcript(history: &[ConversationMessage]) -> String {
    history
        .iter()
        .map(|m| format!("[{}]: {}", m.role.as_str().to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Interviewer style selected by the candidate
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Friendly,
    Tough,
    Faang,
    Roast,
}

impl Persona {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "friendly" => Some(Self::Friendly),
            "tough" => Some(Self::Tough),
            "faang" => Some(Self::Faang),
            "roast" => Some(Self::Roast),
            _ => None,
        }
    }

    /// Tone directive injected into every persona-aware prompt
    pub fn directive(&self) -> &'static str {
        match self {
            Persona::Friendly => "Be supportive and encouraging while staying honest about weaknesses.",
            Persona::Tough => "Be direct and demanding. Do not soften criticism.",
            Persona::Faang => "Hold the bar of a FAANG loop: precise, technical, and unforgiving of hand-waving.",
            Persona::Roast => "Be ruthless and blunt. Call out every weak point without sugar-coating.",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn directive(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Keep questions introductory and offer hints readily.",
            Difficulty::Medium => "Ask standard follow-ups and offer small hints only when the candidate is stuck.",
            Difficulty::Hard => "Probe deeply on bottlenecks, failure modes and trade-offs. Offer no hints.",
        }
    }
}

/// System-design scenario driving the interviewer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    UrlShortener,
    RateLimiter,
    NotificationSystem,
    KvStore,
}

impl Scenario {
    /// Unknown keys map to the default scenario
    pub fn from_key(key: &str) -> Self {
        match key {
            "rate_limiter" => Self::RateLimiter,
            "notification_system" => Self::NotificationSystem,
            "kv_store" => Self::KvStore,
            _ => Self::UrlShortener,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::UrlShortener => "Design a URL Shortening service like TinyURL or bit.ly.",
            Scenario::RateLimiter => "Design a distributed Rate Limiter for a high-traffic API.",
            Scenario::NotificationSystem => {
                "Design a scalable Notification System (Push, Email, SMS) for a social media platform."
            }
            Scenario::KvStore => "Design a distributed Key-Value Store like Redis or DynamoDB.",
        }
    }
}

/// Per-request interview context. Passed explicitly to every call; never shared process-wide.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InterviewContext {
    pub role: String,
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub scenario: Scenario,
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl InterviewContext {
    pub fn new(role: &str) -> Self {
        Self {
            role: role.to_string(),
            ..Default::default()
        }
    }

    pub fn with_resume(mut self, resume_text: &str) -> Self {
        self.resume_text = Some(resume_text.to_string());
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }
}
