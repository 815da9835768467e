// Shadow-Instructor: Provider Abstraction
// One call context shared by both providers:
// - Gemini (primary): native response schema, inline binary attachments
// - Groq (fallback): OpenAI-compatible chat, JSON contract by instruction only

use crate::error::ProviderError;
use crate::schema::StructuredOutput;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Supported providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProviderType {
    /// Gemini through Vertex AI with service-account credentials
    GeminiVertex,
    /// Gemini through Google AI Studio with an API key
    GeminiStudio,
    /// Groq OpenAI-compatible API
    Groq,
}

impl ProviderType {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderType::GeminiVertex => "gemini-vertex",
            ProviderType::GeminiStudio => "gemini",
            ProviderType::Groq => "groq",
        }
    }
}

/// Which configured model a call should run on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelSlot {
    Interviewer,
    Instructor,
    Feedback,
    Shadow,
}

/// The logical task a call performs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Task {
    InterviewTurn,
    Coaching,
    TranscriptAnalysis,
    FrameAnalysis,
    PacingAnalysis,
    ResumeCritique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Text,
    TextAndImage,
    TextAndDocument,
}

/// Binary input sent alongside the prompt
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl Attachment {
    pub fn new(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            bytes: Arc::from(bytes),
        }
    }

    pub fn jpeg(bytes: &[u8]) -> Self {
        Self::new("image/jpeg", bytes)
    }

    pub fn pdf(bytes: &[u8]) -> Self {
        Self::new("application/pdf", bytes)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:` URI form used by OpenAI-compatible vision inputs
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: &str) -> Self {
        Self { role: Role::System, content: content.to_string() }
    }
}

/// Everything one logical request needs. Built per agent call, consumed by
/// both adapters, dropped when the call resolves.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub task: Task,
    pub model_slot: ModelSlot,
    pub system_instruction: String,
    pub prompt: String,
    pub attachment: Option<Attachment>,
    /// Text stand-in for a non-image attachment, for providers that cannot read it
    pub fallback_text: Option<String>,
    pub response_schema: Option<Value>,
    pub schema_name: Option<&'static str>,
    pub temperature: f32,
}

impl CallContext {
    pub fn new(task: Task, model_slot: ModelSlot, system_instruction: &str, prompt: &str) -> Self {
        Self {
            task,
            model_slot,
            system_instruction: system_instruction.to_string(),
            prompt: prompt.to_string(),
            attachment: None,
            fallback_text: None,
            response_schema: None,
            schema_name: None,
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_fallback_text(mut self, text: &str) -> Self {
        self.fallback_text = Some(text.to_string());
        self
    }

    /// Request output conforming to `T`
    pub fn structured<T: StructuredOutput>(mut self) -> Self {
        self.response_schema = Some(T::response_schema());
        self.schema_name = Some(T::NAME);
        self
    }

    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }

    pub fn modality(&self) -> Modality {
        match &self.attachment {
            None => Modality::Text,
            Some(a) if a.is_image() => Modality::TextAndImage,
            Some(_) => Modality::TextAndDocument,
        }
    }
}

/// One provider's wire format behind a uniform call
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Perform one call and return the model's raw text
    async fn invoke(&self, ctx: &CallContext) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PacingAlert;

    #[test]
    fn test_data_uri() {
        let image = Attachment::jpeg(&[0xff, 0xd8, 0xff]);
        assert!(image.is_image());
        assert_eq!(image.data_uri(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_modality_follows_attachment() {
        let ctx = CallContext::new(Task::PacingAnalysis, ModelSlot::Shadow, "sys", "text");
        assert_eq!(ctx.modality(), Modality::Text);
        assert!(!ctx.is_structured());

        let ctx = ctx.with_attachment(Attachment::pdf(b"%PDF")).structured::<PacingAlert>();
        assert_eq!(ctx.modality(), Modality::TextAndDocument);
        assert_eq!(ctx.schema_name, Some("PacingAlert"));
    }

    #[test]
    fn test_temperature_is_clamped() {
        let ctx = CallContext::new(Task::Coaching, ModelSlot::Instructor, "", "").with_temperature(5.0);
        assert_eq!(ctx.temperature, 2.0);
    }
}
