// Shadow-Instructor: The Feedback Agent
// Post-session deep-dive report. A wrong or missing report is worse than an
// explicit error, so every failure propagates.

use super::Agent;
use crate::error::CoreError;
use crate::llm::{CallContext, FallbackOrchestrator, ModelSlot, PromptBuilder, PromptInput, Task};
use crate::persistence::{persist_detached, ReportSink, StoredReport};
use crate::schema::{ConversationMessage, InterviewAnalysisReport, InterviewContext};
use std::sync::Arc;

pub struct FeedbackAgent {
    orchestrator: Arc<FallbackOrchestrator>,
    sink: Option<Arc<dyn ReportSink>>,
    temperature: f32,
}

impl Agent for FeedbackAgent {
    fn name(&self) -> &str {
        "Feedback"
    }

    fn task(&self) -> Task {
        Task::TranscriptAnalysis
    }

    fn model_slot(&self) -> ModelSlot {
        ModelSlot::Feedback
    }
}

impl FeedbackAgent {
    pub fn new(orchestrator: Arc<FallbackOrchestrator>) -> Self {
        Self {
            orchestrator,
            sink: None,
            temperature: 0.2,
        }
    }

    /// Hand every finished report to `sink` in the background
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub async fn generate_deep_report(
        &self,
        history: &[ConversationMessage],
        ctx: &InterviewContext,
    ) -> Result<InterviewAnalysisReport, CoreError> {
        self.generate(history, ctx, None).await
    }

    /// As `generate_deep_report`, tagging the stored copy with the user it belongs to
    pub async fn generate_deep_report_for_user(
        &self,
        history: &[ConversationMessage],
        ctx: &InterviewContext,
        user_id: &str,
    ) -> Result<InterviewAnalysisReport, CoreError> {
        self.generate(history, ctx, Some(user_id)).await
    }

    async fn generate(
        &self,
        history: &[ConversationMessage],
        ctx: &InterviewContext,
        user_id: Option<&str>,
    ) -> Result<InterviewAnalysisReport, CoreError> {
        if history.iter().all(|m| m.content.trim().is_empty()) {
            return Err(CoreError::validation("cannot analyze an empty transcript"));
        }

        let prompt = PromptBuilder::build(self.task(), &PromptInput::from_context(ctx).with_history(history))?;
        let call = CallContext::new(self.task(), self.model_slot(), &prompt.system, &prompt.user)
            .with_temperature(self.temperature)
            .structured::<InterviewAnalysisReport>();

        let report: InterviewAnalysisReport = self.orchestrator.execute(&call).await?;
        log::info!(
            "Generated report for {}: score {}, verdict {}",
            ctx.role,
            report.overall_score,
            report.final_verdict.as_str()
        );

        if let Some(sink) = &self.sink {
            let mut stored = StoredReport::new(&ctx.role, report.clone());
            if let Some(user_id) = user_id {
                stored = stored.with_user(user_id);
            }
            persist_detached(Arc::clone(sink), stored);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::fallback::testing::ScriptedAdapter;
    use crate::llm::prompts::ANTI_HALLUCINATION;
    use crate::schema::{StammeringFrequency, Verdict};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const REPORT: &str = r#"{
        "overall_score": 18,
        "summary": "The candidate named a data structure without explaining it.",
        "speech_analysis": {"pace":"Good","clarity":35,"conciseness":60,"stammering_frequency":"Moderate","filled_pauses_count":3,"long_pauses_count":0},
        "content_analysis": {"technical_accuracy":12,"relevance":40,"problem_solving_skills":10,"key_strengths":[],"areas_for_improvement":["Explain hashing and collisions"]},
        "question_breakdown": [],
        "actionable_tips": ["Commit to an answer and justify it"],
        "final_verdict": "No Hire"
    }"#;

    #[derive(Default)]
    struct MemorySink {
        stored: Mutex<Vec<StoredReport>>,
    }

    #[async_trait]
    impl ReportSink for MemorySink {
        async fn store(&self, report: &StoredReport) -> anyhow::Result<()> {
            self.stored.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    fn history() -> Vec<ConversationMessage> {
        vec![ConversationMessage::user("um, I guess maybe a hash map?")]
    }

    #[tokio::test]
    async fn test_vague_answer_prompt_carries_scoring_rules() {
        let primary = ScriptedAdapter::ok("gemini", REPORT);
        let agent = FeedbackAgent::new(Arc::new(FallbackOrchestrator::with_primary(primary.clone())));

        let report = agent
            .generate_deep_report(&history(), &InterviewContext::new("Backend Engineer"))
            .await
            .unwrap();
        assert_eq!(report.final_verdict, Verdict::NoHire);
        assert_eq!(report.speech_analysis.stammering_frequency, StammeringFrequency::Moderate);

        let seen = primary.last_context().unwrap();
        assert_eq!(seen.model_slot, ModelSlot::Feedback);
        assert!(seen.system_instruction.contains("Backend Engineer"));
        assert!(seen.system_instruction.contains(ANTI_HALLUCINATION));
        assert!(seen.prompt.contains("hash map"));
    }

    #[tokio::test]
    async fn test_empty_transcript_fails_without_call() {
        let primary = ScriptedAdapter::ok("gemini", REPORT);
        let agent = FeedbackAgent::new(Arc::new(FallbackOrchestrator::with_primary(primary.clone())));

        let err = agent
            .generate_deep_report(&[], &InterviewContext::new("SWE"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let agent = FeedbackAgent::new(Arc::new(FallbackOrchestrator::with_primary(ScriptedAdapter::failing(
            "gemini",
            Some(429),
            "quota",
        ))));
        let err = agent
            .generate_deep_report(&history(), &InterviewContext::new("SWE"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::RateLimited(_)));

        let bad_verdict = REPORT.replace("\"No Hire\"", "\"No Hire - lacks depth\"");
        let agent = FeedbackAgent::new(Arc::new(FallbackOrchestrator::with_primary(ScriptedAdapter::ok(
            "gemini",
            &bad_verdict,
        ))));
        let err = agent
            .generate_deep_report(&history(), &InterviewContext::new("SWE"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_report_is_handed_to_sink() {
        let sink = Arc::new(MemorySink::default());
        let agent = FeedbackAgent::new(Arc::new(FallbackOrchestrator::with_primary(ScriptedAdapter::ok(
            "gemini", REPORT,
        ))))
        .with_sink(sink.clone());

        let report = agent
            .generate_deep_report_for_user(&history(), &InterviewContext::new("SRE"), "user-7")
            .await
            .unwrap();

        // The store runs detached; give it a chance to complete
        for _ in 0..50 {
            if !sink.stored.lock().unwrap().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        let stored = sink.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].report, report);
        assert_eq!(stored[0].user_id.as_deref(), Some("user-7"));
        assert_eq!(stored[0].role, "SRE");
    }
}
