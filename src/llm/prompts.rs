// Shadow-Instructor: Prompt Builder
// Task prompts are data files compiled into the binary; `{{var}}` placeholders
// are filled from the per-request input. Same input, same text.

use super::provider::Task;
use crate::error::CoreError;
use crate::schema::{format_transcript, ConversationMessage, Difficulty, InterviewContext, Persona, Scenario};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder pattern"));

/// Directive embedded in every scored prompt
pub const ANTI_HALLUCINATION: &str = "**Anti-Hallucination Rules**:\n\
- Score ONLY what the candidate actually said. Never infer knowledge, reasoning or intent that is not explicitly present in the transcript.\n\
- Vague, hedged or one-word answers (e.g. \"um, I guess maybe a hash map?\") must be scored low. Naming a concept is not understanding it.\n\
- Filler words and hesitation markers (um, uh, like, I guess, maybe) are evidence of disfluency and must be reflected in the speech metrics.\n\
- If there is not enough material to judge a dimension, score it low and say so. Do not fill gaps with assumptions.";

const NO_RESUME: &str = "The candidate has not shared a resume.";

/// Prompt template with variable substitution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: String,
    pub template: String,
    pub required_vars: Vec<String>,
}

impl PromptTemplate {
    pub fn new(name: &str, template: &str) -> Self {
        let mut required_vars: Vec<String> = Vec::new();
        for c in PLACEHOLDER.captures_iter(template) {
            let var = c[1].to_string();
            if !required_vars.contains(&var) {
                required_vars.push(var);
            }
        }

        Self {
            name: name.to_string(),
            template: template.to_string(),
            required_vars,
        }
    }

    /// Render in a single pass, so substituted values are never re-expanded
    pub fn render(&self, vars: &HashMap<&str, String>) -> Result<String, CoreError> {
        if let Some(missing) = self.required_vars.iter().find(|v| !vars.contains_key(v.as_str())) {
            return Err(CoreError::Prompt(format!(
                "template '{}' is missing required variable: {}",
                self.name, missing
            )));
        }

        let rendered = PLACEHOLDER.replace_all(&self.template, |c: &Captures| {
            vars.get(&c[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.trim().to_string())
    }
}

/// System prompts for all agents
pub struct SystemPrompts;

impl SystemPrompts {
    pub fn interviewer() -> &'static str {
        include_str!("../../prompts/interviewer.md")
    }

    pub fn instructor() -> &'static str {
        include_str!("../../prompts/instructor.md")
    }

    pub fn feedback() -> &'static str {
        include_str!("../../prompts/feedback.md")
    }

    pub fn vision() -> &'static str {
        include_str!("../../prompts/vision.md")
    }

    pub fn pacing() -> &'static str {
        include_str!("../../prompts/pacing.md")
    }

    pub fn resume() -> &'static str {
        include_str!("../../prompts/resume.md")
    }

    /// Get the system prompt for a task
    pub fn for_task(task: Task) -> &'static str {
        match task {
            Task::InterviewTurn => Self::interviewer(),
            Task::Coaching => Self::instructor(),
            Task::TranscriptAnalysis => Self::feedback(),
            Task::FrameAnalysis => Self::vision(),
            Task::PacingAnalysis => Self::pacing(),
            Task::ResumeCritique => Self::resume(),
        }
    }

    /// The per-call user message for a task
    fn user_template(task: Task) -> &'static str {
        match task {
            Task::InterviewTurn => "{{transcript}}",
            Task::Coaching => "TRANSCRIPT:\n{{transcript}}\n\nCoach the candidate on their most recent answer.",
            Task::TranscriptAnalysis => "TRANSCRIPT:\n{{transcript}}",
            Task::FrameAnalysis => "Analyze this webcam frame of the candidate.",
            Task::PacingAnalysis => "Text: \"{{transcript}}\"",
            Task::ResumeCritique => "Critique this resume.",
        }
    }
}

/// Everything a prompt may draw on
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptInput {
    pub role: String,
    pub persona: Persona,
    pub difficulty: Difficulty,
    pub scenario: Scenario,
    pub resume_text: Option<String>,
    /// Formatted transcript, or a raw text chunk for pacing
    pub transcript: String,
}

impl PromptInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_context(ctx: &InterviewContext) -> Self {
        Self {
            role: ctx.role.clone(),
            persona: ctx.persona,
            difficulty: ctx.difficulty,
            scenario: ctx.scenario,
            resume_text: ctx.resume_text.clone(),
            transcript: String::new(),
        }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_history(mut self, history: &[ConversationMessage]) -> Self {
        self.transcript = format_transcript(history);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.transcript = text.to_string();
        self
    }

    fn to_vars(&self) -> HashMap<&'static str, String> {
        let resume_section = match self.resume_text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => format!(
                "**Candidate Resume** (use it to tailor follow-up questions):\n{}",
                text
            ),
            _ => NO_RESUME.to_string(),
        };
        let role = if self.role.trim().is_empty() {
            "Software Engineer".to_string()
        } else {
            self.role.trim().to_string()
        };
        let transcript = if self.transcript.trim().is_empty() {
            "(The interview is just starting. Open with your first question.)".to_string()
        } else {
            self.transcript.clone()
        };

        HashMap::from([
            ("role", role),
            ("persona", self.persona.directive().to_string()),
            ("difficulty", self.difficulty.directive().to_string()),
            ("scenario", self.scenario.description().to_string()),
            ("resume_section", resume_section),
            ("anti_hallucination", ANTI_HALLUCINATION.to_string()),
            ("transcript", transcript),
        ])
    }
}

/// A rendered system instruction plus user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub system: String,
    pub user: String,
}

pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(task: Task, input: &PromptInput) -> Result<BuiltPrompt, CoreError> {
        let vars = input.to_vars();
        let system = PromptTemplate::new(&format!("{:?}.system", task), SystemPrompts::for_task(task)).render(&vars)?;
        let user = PromptTemplate::new(&format!("{:?}.user", task), SystemPrompts::user_template(task)).render(&vars)?;
        Ok(BuiltPrompt { system, user })
    }
}
