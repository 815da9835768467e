// Shadow-Instructor: Agent System
// Each agent pairs one task prompt with one result shape and decides how a
// failure surfaces: degrade (live agents) or propagate (batch agents).

pub mod feedback;
pub mod instructor;
pub mod interviewer;
pub mod resume;
pub mod shadow;

// Re-exports
pub use feedback::FeedbackAgent;
pub use instructor::InstructorAgent;
pub use interviewer::{InterviewerAgent, INTERVIEWER_APOLOGY};
pub use resume::{ResumeAgent, ResumeDocument};
pub use shadow::{ShadowAgent, PACING_MIN_WORDS};

use crate::llm::{ModelSlot, Task};

/// Base trait for all agents
pub trait Agent: Send + Sync {
    /// Get the agent's name
    fn name(&self) -> &str;

    /// The primary task this agent performs. Agents with secondary checks
    /// (the shadow's pacing pass) name those tasks at the call site.
    fn task(&self) -> Task;

    /// Which configured model serves this agent
    fn model_slot(&self) -> ModelSlot;
}
