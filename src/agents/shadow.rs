// Shadow-Instructor: The Shadow Agent
// Two independent live checks, both best-effort:
// - single webcam frame -> VisionAlert (eye contact, posture, expression)
// - rolling transcript chunk -> PacingAlert (rambling, filler words)
// Any failure yields `{"status": "error"}`; the session keeps running.

use super::Agent;
use crate::error::CoreError;
use crate::llm::{Attachment, CallContext, FallbackOrchestrator, ModelSlot, PromptBuilder, PromptInput, Task};
use crate::schema::{PacingAlert, Persona, StructuredOutput, VisionAlert};
use base64::Engine;
use std::sync::Arc;

/// Chunks shorter than this carry no reliable pacing signal
pub const PACING_MIN_WORDS: usize = 30;

const FRAME_TEMPERATURE: f32 = 0.4;
const PACING_TEMPERATURE: f32 = 0.3;

pub struct ShadowAgent {
    orchestrator: Arc<FallbackOrchestrator>,
}

impl Agent for ShadowAgent {
    fn name(&self) -> &str {
        "Shadow"
    }

    fn task(&self) -> Task {
        Task::FrameAnalysis
    }

    fn model_slot(&self) -> ModelSlot {
        ModelSlot::Shadow
    }
}

impl ShadowAgent {
    pub fn new(orchestrator: Arc<FallbackOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Judge one JPEG frame
    pub async fn analyze_frame(&self, image: &[u8], persona: Persona) -> VisionAlert {
        if image.is_empty() {
            log::warn!("Skipping frame analysis: empty image");
            return VisionAlert::error();
        }

        let input = PromptInput::new().with_persona(persona);
        let attachment = Some(Attachment::jpeg(image));
        match self.run::<VisionAlert>(self.task(), input, attachment, FRAME_TEMPERATURE).await {
            Ok(alert) => alert,
            Err(e) => {
                log::error!("Shadow vision error: {}", e);
                VisionAlert::error()
            }
        }
    }

    /// Judge a base64-encoded JPEG frame as it arrives from a browser client
    pub async fn analyze_frame_base64(&self, encoded: &str, persona: Persona) -> VisionAlert {
        let payload = encoded
            .split_once(";base64,")
            .map(|(_, data)| data)
            .unwrap_or(encoded)
            .trim();
        match base64::engine::general_purpose::STANDARD.decode(payload) {
            Ok(bytes) => self.analyze_frame(&bytes, persona).await,
            Err(e) => {
                log::warn!("Rejecting frame with invalid base64: {}", e);
                VisionAlert::error()
            }
        }
    }

    /// Judge a transcript chunk for rambling. Short chunks are `ok` without a call.
    pub async fn analyze_pacing(&self, text: &str, persona: Persona) -> PacingAlert {
        if text.split_whitespace().count() < PACING_MIN_WORDS {
            return PacingAlert::ok();
        }

        let input = PromptInput::new().with_persona(persona).with_text(text.trim());
        match self.run::<PacingAlert>(Task::PacingAnalysis, input, None, PACING_TEMPERATURE).await {
            Ok(alert) => alert,
            Err(e) => {
                log::error!("Shadow pacing error: {}", e);
                PacingAlert::error()
            }
        }
    }

    async fn run<T: StructuredOutput>(
        &self,
        task: Task,
        input: PromptInput,
        attachment: Option<Attachment>,
        temperature: f32,
    ) -> Result<T, CoreError> {
        let prompt = PromptBuilder::build(task, &input)?;
        let mut call = CallContext::new(task, self.model_slot(), &prompt.system, &prompt.user)
            .with_temperature(temperature)
            .structured::<T>();
        if let Some(attachment) = attachment {
            call = call.with_attachment(attachment);
        }
        self.orchestrator.execute(&call).await
    }
}
