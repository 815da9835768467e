// Shadow-Instructor: The Resume Agent
// Visual critique of a resume PDF. The primary provider reads the rendered
// document; the fallback provider only gets caller-extracted text, and the
// result says which of the two it was.

use super::Agent;
use crate::error::CoreError;
use crate::llm::{Attachment, CallContext, FallbackOrchestrator, ModelSlot, PromptBuilder, PromptInput, Route, Task};
use crate::schema::{AnalysisMode, ResumeCritique};
use std::sync::Arc;

const PDF_MAGIC: &[u8] = b"%PDF";

/// An uploaded resume. Text extraction happens upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeDocument {
    pub pdf_bytes: Vec<u8>,
    /// Used when the answering provider cannot read PDFs
    pub extracted_text: Option<String>,
}

impl ResumeDocument {
    pub fn new(pdf_bytes: Vec<u8>) -> Self {
        Self {
            pdf_bytes,
            extracted_text: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.extracted_text = Some(text.to_string()).filter(|t| !t.trim().is_empty());
        self
    }
}

pub struct ResumeAgent {
    orchestrator: Arc<FallbackOrchestrator>,
}

impl Agent for ResumeAgent {
    fn name(&self) -> &str {
        "Resume Critic"
    }

    fn task(&self) -> Task {
        Task::ResumeCritique
    }

    fn model_slot(&self) -> ModelSlot {
        ModelSlot::Shadow
    }
}

impl ResumeAgent {
    pub fn new(orchestrator: Arc<FallbackOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Never returns an empty success: every failure is an error
    pub async fn analyze_resume_visual(&self, document: &ResumeDocument) -> Result<ResumeCritique, CoreError> {
        if !document.pdf_bytes.starts_with(PDF_MAGIC) {
            return Err(CoreError::validation("resume is not a PDF document"));
        }

        let prompt = PromptBuilder::build(self.task(), &PromptInput::new())?;
        let mut call = CallContext::new(self.task(), self.model_slot(), &prompt.system, &prompt.user)
            .with_temperature(0.3)
            .with_attachment(Attachment::pdf(&document.pdf_bytes))
            .structured::<ResumeCritique>();
        if let Some(text) = &document.extracted_text {
            call = call.with_fallback_text(text);
        }

        let (mut critique, route): (ResumeCritique, Route) = self.orchestrator.execute_routed(&call).await?;
        critique.analysis_mode = match route {
            Route::Primary => AnalysisMode::Visual,
            Route::Fallback => AnalysisMode::Text,
        };
        log::info!("Resume critique: score {}/10 ({:?})", critique.score, critique.analysis_mode);
        Ok(critique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::fallback::testing::ScriptedAdapter;
    use crate::llm::Modality;

    const CRITIQUE: &str = r#"{"score":7,"summary":"Clean layout.","issues":[{"category":"Typography","description":"Three fonts","suggestion":"Use one"}],"strengths":["Clear sections"]}"#;

    fn document() -> ResumeDocument {
        ResumeDocument::new(b"%PDF-1.7 fake".to_vec()).with_text("Jane Doe\nRust Engineer")
    }

    #[tokio::test]
    async fn test_primary_answer_is_visual() {
        let primary = ScriptedAdapter::ok("gemini", CRITIQUE);
        let agent = ResumeAgent::new(Arc::new(FallbackOrchestrator::with_primary(primary.clone())));

        let critique = agent.analyze_resume_visual(&document()).await.unwrap();
        assert_eq!(critique.analysis_mode, AnalysisMode::Visual);
        assert_eq!(critique.score, 7);

        let seen = primary.last_context().unwrap();
        assert_eq!(seen.modality(), Modality::TextAndDocument);
        assert_eq!(seen.fallback_text.as_deref(), Some("Jane Doe\nRust Engineer"));
    }

    #[tokio::test]
    async fn test_fallback_answer_is_text() {
        let agent = ResumeAgent::new(Arc::new(FallbackOrchestrator::new(
            ScriptedAdapter::failing("gemini", Some(429), "RESOURCE_EXHAUSTED"),
            Some(ScriptedAdapter::ok("groq", CRITIQUE)),
        )));
        let critique = agent.analyze_resume_visual(&document()).await.unwrap();
        assert_eq!(critique.analysis_mode, AnalysisMode::Text);
    }

    #[tokio::test]
    async fn test_region_error_without_fallback_is_explicit() {
        let agent = ResumeAgent::new(Arc::new(FallbackOrchestrator::with_primary(ScriptedAdapter::failing(
            "gemini",
            Some(400),
            "FAILED_PRECONDITION: User location is not supported for the API use.",
        ))));
        let err = agent.analyze_resume_visual(&document()).await.unwrap_err();
        assert!(matches!(err, CoreError::RegionUnavailable(_)));
    }

    #[tokio::test]
    async fn test_non_pdf_rejected_without_call() {
        let primary = ScriptedAdapter::ok("gemini", CRITIQUE);
        let agent = ResumeAgent::new(Arc::new(FallbackOrchestrator::with_primary(primary.clone())));
        let err = agent
            .analyze_resume_visual(&ResumeDocument::new(b"hello".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_score_out_of_range_is_rejected() {
        let agent = ResumeAgent::new(Arc::new(FallbackOrchestrator::with_primary(ScriptedAdapter::ok(
            "gemini",
            &CRITIQUE.replace("\"score\":7", "\"score\":0"),
        ))));
        assert!(agent.analyze_resume_visual(&document()).await.is_err());
    }
}
