// Shadow-Instructor: Provider Layer
// Primary (Gemini) and fallback (Groq) adapters behind one orchestrated call path

pub mod auth;
pub mod classifier;
pub mod factory;
pub mod fallback;
pub mod gemini;
pub mod groq;
pub mod json;
pub mod prompts;
pub mod provider;

pub use classifier::{classify, FailureClass};
pub use factory::ClientFactory;
pub use fallback::{FallbackOrchestrator, FallbackStats, Route};
pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use json::{extract_json, parse_structured};
pub use prompts::{BuiltPrompt, PromptBuilder, PromptInput, PromptTemplate, SystemPrompts};
pub use provider::{
    Attachment, CallContext, Message, Modality, ModelSlot, ProviderAdapter, ProviderType, Role, Task,
};
