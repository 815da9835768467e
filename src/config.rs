// Shadow-Instructor: Process-wide configuration
// Read once at startup from the environment (.env supported) and never mutated.
//
// Configuration (.env file):
// - GOOGLE_APPLICATION_CREDENTIALS_JSON: service-account key (Vertex AI), preferred when present
// - GOOGLE_CLOUD_PROJECT / GOOGLE_CLOUD_LOCATION: Vertex AI project and region (default: us-central1)
// - GEMINI_API_KEY: Google AI Studio key, used when no service account is configured
// - INTERVIEWER_MODEL / INSTRUCTOR_MODEL / FEEDBACK_MODEL / SHADOW_MODEL: per-agent Gemini models
// - GROQ_API_KEY: enables the fallback provider
// - GROQ_MODEL / GROQ_VISION_MODEL: fallback text and vision models
// - GEMINI_BASE_URL / GROQ_BASE_URL: endpoint overrides
// - REPORTS_PATH: JSONL file that receives finished analysis reports

use crate::llm::ModelSlot;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Gemini model per agent
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub interviewer: String,
    pub instructor: String,
    pub feedback: String,
    pub shadow: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            interviewer: "gemini-2.5-flash".to_string(),
            instructor: "gemini-2.5-pro".to_string(),
            feedback: "gemini-2.5-pro".to_string(),
            shadow: "gemini-2.5-flash".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn model_for(&self, slot: ModelSlot) -> &str {
        match slot {
            ModelSlot::Interviewer => &self.interviewer,
            ModelSlot::Instructor => &self.instructor,
            ModelSlot::Feedback => &self.feedback,
            ModelSlot::Shadow => &self.shadow,
        }
    }
}

/// Secondary provider settings. Present only when an API key is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    pub vision_model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub service_account_json: Option<String>,
    pub project: Option<String>,
    pub location: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: Option<String>,
    pub models: ModelConfig,
    pub groq: Option<GroqConfig>,
    pub reports_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load from the process environment, after merging a `.env` file if one exists
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = ModelConfig::default();

        let groq = get("GROQ_API_KEY").map(|api_key| GroqConfig {
            api_key,
            model: get("GROQ_MODEL").unwrap_or_else(|| "llama-3.3-70b-versatile".to_string()),
            vision_model: get("GROQ_VISION_MODEL")
                .unwrap_or_else(|| "meta-llama/llama-4-scout-17b-16e-instruct".to_string()),
            base_url: get("GROQ_BASE_URL").unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
        });

        Self {
            service_account_json: get("GOOGLE_APPLICATION_CREDENTIALS_JSON"),
            project: get("GOOGLE_CLOUD_PROJECT"),
            location: get("GOOGLE_CLOUD_LOCATION").unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_base_url: get("GEMINI_BASE_URL"),
            models: ModelConfig {
                interviewer: get("INTERVIEWER_MODEL").unwrap_or(defaults.interviewer),
                instructor: get("INSTRUCTOR_MODEL").unwrap_or(defaults.instructor),
                feedback: get("FEEDBACK_MODEL").unwrap_or(defaults.feedback),
                shadow: get("SHADOW_MODEL").unwrap_or(defaults.shadow),
            },
            groq,
            reports_path: get("REPORTS_PATH").map(PathBuf::from),
        }
    }

    pub fn has_fallback(&self) -> bool {
        self.groq.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.location, DEFAULT_LOCATION);
        assert!(config.gemini_api_key.is_none());
        assert!(!config.has_fallback());
        assert_eq!(config.models, ModelConfig::default());
    }

    #[test]
    fn test_groq_requires_key_and_empty_values_are_unset() {
        let config = AppConfig::from_lookup(lookup(&[("GROQ_API_KEY", "  "), ("GROQ_MODEL", "x")]));
        assert!(config.groq.is_none());

        let config = AppConfig::from_lookup(lookup(&[("GROQ_API_KEY", "gsk_test")]));
        let groq = config.groq.unwrap();
        assert_eq!(groq.base_url, DEFAULT_GROQ_BASE_URL);
        assert_eq!(groq.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_model_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SHADOW_MODEL", "gemini-2.0-flash"),
            ("GOOGLE_CLOUD_LOCATION", "europe-west4"),
        ]));
        assert_eq!(config.models.model_for(ModelSlot::Shadow), "gemini-2.0-flash");
        assert_eq!(config.models.model_for(ModelSlot::Feedback), "gemini-2.5-pro");
        assert_eq!(config.location, "europe-west4");
    }
}
