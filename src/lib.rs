// Shadow-Instructor: Interview Simulation Core
// Interviewer, coaching, deep-report, shadow and resume agents over a
// primary provider with a single fallback attempt.

use std::sync::Arc;

// Structured result shapes shared by both providers
pub mod schema;

// Error taxonomy
pub mod error;

// Process-wide configuration
pub mod config;

// Provider layer - adapters, classifier, orchestrator, prompts
pub mod llm;

// Agent System module - Interviewer, Instructor, Feedback, Shadow, Resume
pub mod agents;

// Report storage boundary
pub mod persistence;

// Re-export commonly used types
pub use agents::{
    Agent, FeedbackAgent, InstructorAgent, InterviewerAgent, ResumeAgent, ResumeDocument, ShadowAgent,
    INTERVIEWER_APOLOGY, PACING_MIN_WORDS,
};
pub use config::AppConfig;
pub use error::{CoreError, ProviderError};
pub use llm::{ClientFactory, FallbackOrchestrator, FallbackStats, ProviderAdapter};
pub use persistence::{JsonlReportSink, ReportSink, StoredReport};
pub use schema::{
    AlertStatus, CoachingFeedback, ConversationMessage, InterviewAnalysisReport, InterviewContext, PacingAlert,
    Persona, ResumeCritique, VisionAlert,
};

/// Result of one candidate turn: the interviewer's reply plus optional coaching
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub coaching: Option<CoachingFeedback>,
}

/// All agents wired to one shared orchestrator. Build once at startup and
/// share across sessions; it holds no per-session state.
pub struct InterviewCore {
    orchestrator: Arc<FallbackOrchestrator>,
    interviewer: InterviewerAgent,
    instructor: InstructorAgent,
    feedback: FeedbackAgent,
    shadow: ShadowAgent,
    resume: ResumeAgent,
}

impl InterviewCore {
    /// Resolve credentials and build every client up front.
    /// Missing primary credentials fail here, not on the first call.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let factory = ClientFactory::new(config)?;
        let primary: Arc<dyn ProviderAdapter> = Arc::new(factory.primary_client(None)?);
        let secondary = factory
            .fallback_client()
            .map(|client| Arc::new(client) as Arc<dyn ProviderAdapter>);

        let core = Self::with_adapters(primary, secondary);
        Ok(match &config.reports_path {
            Some(path) => {
                log::info!("Persisting reports to {}", path.display());
                core.with_report_sink(Arc::new(JsonlReportSink::new(path)))
            }
            None => core,
        })
    }

    /// Wire the agents over caller-supplied adapters
    pub fn with_adapters(primary: Arc<dyn ProviderAdapter>, secondary: Option<Arc<dyn ProviderAdapter>>) -> Self {
        let orchestrator = Arc::new(FallbackOrchestrator::new(primary, secondary));
        Self {
            interviewer: InterviewerAgent::new(Arc::clone(&orchestrator)),
            instructor: InstructorAgent::new(Arc::clone(&orchestrator)),
            feedback: FeedbackAgent::new(Arc::clone(&orchestrator)),
            shadow: ShadowAgent::new(Arc::clone(&orchestrator)),
            resume: ResumeAgent::new(Arc::clone(&orchestrator)),
            orchestrator,
        }
    }

    /// Hand finished deep reports to `sink`
    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.feedback = FeedbackAgent::new(Arc::clone(&self.orchestrator)).with_sink(sink);
        self
    }

    pub fn orchestrator(&self) -> &FallbackOrchestrator {
        &self.orchestrator
    }

    pub fn stats(&self) -> FallbackStats {
        self.orchestrator.stats()
    }

    pub async fn generate_turn(&self, history: &[ConversationMessage], ctx: &InterviewContext) -> String {
        self.interviewer.generate_turn(history, ctx).await
    }

    pub async fn generate_coaching(&self, history: &[ConversationMessage]) -> Option<CoachingFeedback> {
        self.instructor.generate_coaching(history).await
    }

    pub async fn generate_deep_report(
        &self,
        history: &[ConversationMessage],
        ctx: &InterviewContext,
    ) -> Result<InterviewAnalysisReport, CoreError> {
        self.feedback.generate_deep_report(history, ctx).await
    }

    pub async fn analyze_frame(&self, image: &[u8], persona: Persona) -> VisionAlert {
        self.shadow.analyze_frame(image, persona).await
    }

    pub async fn analyze_pacing(&self, text: &str, persona: Persona) -> PacingAlert {
        self.shadow.analyze_pacing(text, persona).await
    }

    pub async fn analyze_resume_visual(&self, document: &ResumeDocument) -> Result<ResumeCritique, CoreError> {
        self.resume.analyze_resume_visual(document).await
    }

    /// Reply and coaching for the same transcript snapshot, issued concurrently
    pub async fn respond(&self, snapshot: &[ConversationMessage], ctx: &InterviewContext) -> TurnOutcome {
        let (reply, coaching) = tokio::join!(
            self.interviewer.generate_turn(snapshot, ctx),
            self.instructor.generate_coaching(snapshot)
        );
        TurnOutcome { reply, coaching }
    }
}
