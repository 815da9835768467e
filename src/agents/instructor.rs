// Shadow-Instructor: The Instructor Agent
// Live coaching on the candidate's latest answer. Coaching is best-effort:
// no feedback this turn is always an acceptable outcome.

use super::Agent;
use crate::error::CoreError;
use crate::llm::{CallContext, FallbackOrchestrator, ModelSlot, PromptBuilder, PromptInput, Task};
use crate::schema::{CoachingFeedback, ConversationMessage, Persona, Speaker};
use std::sync::Arc;

pub struct InstructorAgent {
    orchestrator: Arc<FallbackOrchestrator>,
    persona: Persona,
    temperature: f32,
}

impl Agent for InstructorAgent {
    fn name(&self) -> &str {
        "Shadow Instructor"
    }

    fn task(&self) -> Task {
        Task::Coaching
    }

    fn model_slot(&self) -> ModelSlot {
        ModelSlot::Instructor
    }
}

/// Coaching only makes sense right after the candidate has spoken
pub fn should_coach(history: &[ConversationMessage]) -> bool {
    matches!(history.last(), Some(msg) if msg.role == Speaker::User)
}

impl InstructorAgent {
    pub fn new(orchestrator: Arc<FallbackOrchestrator>) -> Self {
        Self {
            orchestrator,
            persona: Persona::default(),
            temperature: 0.7,
        }
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    /// Structured critique of the latest answer, or `None` when there is
    /// nothing to coach or the call failed
    pub async fn generate_coaching(&self, history: &[ConversationMessage]) -> Option<CoachingFeedback> {
        if !should_coach(history) {
            log::debug!("Skipping coaching: last message is not from the candidate");
            return None;
        }

        match self.critique(history).await {
            Ok(feedback) => Some(feedback),
            Err(e) => {
                log::error!("Coaching failed, no feedback this turn: {}", e);
                None
            }
        }
    }

    async fn critique(&self, history: &[ConversationMessage]) -> Result<CoachingFeedback, CoreError> {
        let input = PromptInput::new().with_persona(self.persona).with_history(history);
        let prompt = PromptBuilder::build(self.task(), &input)?;
        let call = CallContext::new(self.task(), self.model_slot(), &prompt.system, &prompt.user)
            .with_temperature(self.temperature)
            .structured::<CoachingFeedback>();

        self.orchestrator.execute(&call).await
    }
}
