// Shadow-Instructor: The Interviewer Agent
// Free-text interview turns. The candidate must always get an answer, so any
// unrecoverable failure becomes a scripted line.

use super::Agent;
use crate::error::CoreError;
use crate::llm::{CallContext, FallbackOrchestrator, ModelSlot, PromptBuilder, PromptInput, Task};
use crate::schema::{ConversationMessage, InterviewContext};
use std::sync::Arc;

pub const INTERVIEWER_APOLOGY: &str = "I apologize, let's move on to the next topic.";

pub struct InterviewerAgent {
    orchestrator: Arc<FallbackOrchestrator>,
    temperature: f32,
}

impl Agent for InterviewerAgent {
    fn name(&self) -> &str {
        "Interviewer"
    }

    fn task(&self) -> Task {
        Task::InterviewTurn
    }

    fn model_slot(&self) -> ModelSlot {
        ModelSlot::Interviewer
    }
}

impl InterviewerAgent {
    pub fn new(orchestrator: Arc<FallbackOrchestrator>) -> Self {
        Self {
            orchestrator,
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Next interviewer line for the transcript so far. Never fails.
    pub async fn generate_turn(&self, history: &[ConversationMessage], ctx: &InterviewContext) -> String {
        match self.try_generate_turn(history, ctx).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("Interviewer turn failed, using scripted reply: {}", e);
                INTERVIEWER_APOLOGY.to_string()
            }
        }
    }

    /// Same as `generate_turn`, surfacing the failure instead of degrading
    pub async fn try_generate_turn(
        &self,
        history: &[ConversationMessage],
        ctx: &InterviewContext,
    ) -> Result<String, CoreError> {
        let prompt = PromptBuilder::build(self.task(), &PromptInput::from_context(ctx).with_history(history))?;
        let call = CallContext::new(self.task(), self.model_slot(), &prompt.system, &prompt.user)
            .with_temperature(self.temperature);

        let text = self.orchestrator.execute_text(&call).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::validation("interviewer returned an empty turn"));
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::fallback::testing::ScriptedAdapter;
    use crate::schema::{Persona, Scenario};

    fn agent(primary: Arc<ScriptedAdapter>, secondary: Option<Arc<ScriptedAdapter>>) -> InterviewerAgent {
        let secondary = secondary.map(|s| s as Arc<dyn crate::llm::ProviderAdapter>);
        InterviewerAgent::new(Arc::new(FallbackOrchestrator::new(primary, secondary)))
    }

    #[tokio::test]
    async fn test_turn_is_trimmed_model_text() {
        let primary = ScriptedAdapter::ok("gemini", "  What are the read/write ratios?\n");
        let interviewer = agent(primary.clone(), None);
        let ctx = InterviewContext::new("Backend Engineer")
            .with_scenario(Scenario::KvStore)
            .with_persona(Persona::Tough);

        let reply = interviewer
            .generate_turn(&[ConversationMessage::user("I'd start with requirements.")], &ctx)
            .await;
        assert_eq!(reply, "What are the read/write ratios?");

        let seen = primary.last_context().unwrap();
        assert_eq!(seen.model_slot, ModelSlot::Interviewer);
        assert!(seen.system_instruction.contains(Scenario::KvStore.description()));
        assert!(seen.prompt.contains("[USER]: I'd start with requirements."));
        assert!(!seen.is_structured());
    }

    #[tokio::test]
    async fn test_failure_degrades_to_apology() {
        let interviewer = agent(ScriptedAdapter::failing("gemini", Some(500), "internal"), None);
        let reply = interviewer.generate_turn(&[], &InterviewContext::new("SWE")).await;
        assert_eq!(reply, INTERVIEWER_APOLOGY);
    }

    #[tokio::test]
    async fn test_rate_limit_without_fallback_degrades() {
        let interviewer = agent(ScriptedAdapter::failing("gemini", Some(429), "RESOURCE_EXHAUSTED"), None);
        let reply = interviewer.generate_turn(&[], &InterviewContext::new("SWE")).await;
        assert_eq!(reply, INTERVIEWER_APOLOGY);
    }

    #[tokio::test]
    async fn test_rate_limit_uses_fallback_text() {
        let secondary = ScriptedAdapter::ok("groq", "Tell me about your API design.");
        let interviewer = agent(
            ScriptedAdapter::failing("gemini", Some(429), "quota"),
            Some(secondary.clone()),
        );
        let reply = interviewer.generate_turn(&[], &InterviewContext::new("SWE")).await;
        assert_eq!(reply, "Tell me about your API design.");
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_model_text_is_an_error() {
        let interviewer = agent(ScriptedAdapter::ok("gemini", "   "), None);
        let err = interviewer
            .try_generate_turn(&[], &InterviewContext::new("SWE"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
