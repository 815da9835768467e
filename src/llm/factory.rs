// Shadow-Instructor: Provider Client Factory
// Resolves credentials once at startup and hands out ready-to-call clients.
//
// Selection order for the primary provider:
// 1. Service-account key JSON -> Vertex AI (bearer tokens minted from the key)
// 2. Gemini API key           -> Google AI Studio
// 3. Neither                  -> ConfigurationError
//
// The fallback provider is optional and only built when a Groq key is present.

use super::auth::{ServiceAccountKey, ServiceAccountTokenSource, TokenSource};
use super::gemini::GeminiClient;
use super::groq::GroqClient;
use crate::config::AppConfig;
use crate::error::CoreError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ClientFactory {
    config: AppConfig,
    http: Client,
}

impl ClientFactory {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            http,
        })
    }

    /// Build the primary client, optionally for a non-default Vertex location.
    /// The location is ignored for API-key clients.
    pub fn primary_client(&self, location: Option<&str>) -> Result<GeminiClient, CoreError> {
        let client = if let Some(raw) = &self.config.service_account_json {
            let key = ServiceAccountKey::from_json(raw)?;
            let project = self
                .config
                .project
                .clone()
                .or_else(|| key.project_id.clone())
                .ok_or_else(|| {
                    CoreError::Configuration(
                        "service account configured but no GOOGLE_CLOUD_PROJECT and no project_id in key".to_string(),
                    )
                })?;
            let location = location.unwrap_or(&self.config.location);
            let tokens: Arc<dyn TokenSource> = Arc::new(ServiceAccountTokenSource::new(key, self.http.clone())?);

            log::info!("Primary provider: Vertex AI (project={}, location={})", project, location);
            GeminiClient::with_vertex(self.http.clone(), &project, location, tokens, self.config.models.clone())
        } else if let Some(api_key) = &self.config.gemini_api_key {
            log::info!("Primary provider: Google AI Studio (API key)");
            GeminiClient::with_api_key(self.http.clone(), api_key, self.config.models.clone())
        } else {
            return Err(CoreError::Configuration(
                "no primary provider credentials: set GOOGLE_APPLICATION_CREDENTIALS_JSON or GEMINI_API_KEY".to_string(),
            ));
        };

        Ok(match &self.config.gemini_base_url {
            Some(url) => client.with_base_url(url),
            None => client,
        })
    }

    /// The secondary provider, when configured
    pub fn fallback_client(&self) -> Option<GroqClient> {
        match &self.config.groq {
            Some(groq) => {
                log::info!("Fallback provider: Groq ({})", groq.model);
                Some(GroqClient::new(self.http.clone(), groq))
            }
            None => {
                log::warn!("GROQ_API_KEY not set; rate-limited calls will not fall back");
                None
            }
        }
    }
}
