// Shadow-Instructor: Primary Call Adapter (Gemini generateContent)
// - Structured calls use native schema-constrained decoding (responseSchema)
// - Attachments travel inline as base64 blobs alongside the prompt
// - Works against Vertex AI (bearer token) or Google AI Studio (API key)

use super::auth::TokenSource;
use super::provider::{CallContext, ProviderAdapter, ProviderType};
use crate::config::ModelConfig;
use crate::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const STUDIO_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// How requests are authenticated and routed
#[derive(Clone)]
pub enum GeminiAuth {
    ApiKey(String),
    Vertex {
        project: String,
        location: String,
        tokens: Arc<dyn TokenSource>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self { text: Some(text.to_string()), inline_data: None }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    /// Thinking models interleave thought summaries with the answer
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Ready-to-call primary client. Stateless per call; share it across sessions.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    auth: GeminiAuth,
    models: ModelConfig,
    base_url: Option<String>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("models", &self.models)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn with_api_key(http: Client, api_key: &str, models: ModelConfig) -> Self {
        Self {
            http,
            auth: GeminiAuth::ApiKey(api_key.to_string()),
            models,
            base_url: None,
        }
    }

    pub fn with_vertex(
        http: Client,
        project: &str,
        location: &str,
        tokens: Arc<dyn TokenSource>,
        models: ModelConfig,
    ) -> Self {
        Self {
            http,
            auth: GeminiAuth::Vertex {
                project: project.to_string(),
                location: location.to_string(),
                tokens,
            },
            models,
            base_url: None,
        }
    }

    /// Override the API root (tests, proxies)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    pub fn provider_type(&self) -> ProviderType {
        match self.auth {
            GeminiAuth::ApiKey(_) => ProviderType::GeminiStudio,
            GeminiAuth::Vertex { .. } => ProviderType::GeminiVertex,
        }
    }

    pub fn models(&self) -> &ModelConfig {
        &self.models
    }

    /// Vertex location this client targets, if any
    pub fn location(&self) -> Option<&str> {
        match &self.auth {
            GeminiAuth::Vertex { location, .. } => Some(location),
            GeminiAuth::ApiKey(_) => None,
        }
    }

    pub fn endpoint(&self, model: &str) -> String {
        match &self.auth {
            GeminiAuth::ApiKey(_) => {
                let base = self.base_url.as_deref().unwrap_or(STUDIO_BASE_URL);
                format!("{}/models/{}:generateContent", base, model)
            }
            GeminiAuth::Vertex { project, location, .. } => {
                let base = match &self.base_url {
                    Some(url) => url.clone(),
                    None if location == "global" => "https://aiplatform.googleapis.com/v1".to_string(),
                    None => format!("https://{}-aiplatform.googleapis.com/v1", location),
                };
                format!(
                    "{}/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                    base, project, location, model
                )
            }
        }
    }

    /// Shape a call context into a generateContent body
    pub fn build_request(ctx: &CallContext) -> GenerateContentRequest {
        let mut parts = vec![Part::text(&ctx.prompt)];
        if let Some(attachment) = &ctx.attachment {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: attachment.mime_type.clone(),
                    data: attachment.to_base64(),
                }),
            });
        }

        let system_instruction = if ctx.system_instruction.trim().is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: vec![Part::text(&ctx.system_instruction)],
            })
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction,
            generation_config: GenerationConfig {
                temperature: ctx.temperature,
                response_mime_type: ctx.response_schema.as_ref().map(|_| "application/json".to_string()),
                response_schema: ctx.response_schema.clone(),
            },
        }
    }

    /// Send one generateContent call and return the concatenated answer text
    pub async fn generate(&self, model: &str, ctx: &CallContext) -> Result<String, ProviderError> {
        let provider = self.provider_type().name();
        let body = Self::build_request(ctx);

        let mut request = self.http.post(self.endpoint(model)).json(&body);
        request = match &self.auth {
            GeminiAuth::ApiKey(key) => request.header("x-goog-api-key", key),
            GeminiAuth::Vertex { tokens, .. } => request.bearer_auth(tokens.access_token().await?),
        };

        log::debug!("{} call: model={} task={:?} modality={:?}", provider, model, ctx.task, ctx.modality());

        // The URL is dropped from transport errors: it contains "generateContent",
        // which would otherwise trip the rate-limit token match.
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::transport(provider, e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(provider, Some(status.as_u16()), describe_error(&text)));
        }

        let data: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(provider, None, format!("unreadable response: {}", e.without_url())))?;

        let candidate = data
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::new(provider, None, "response has no candidates"))?;

        let text: String = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ProviderError::new(
                provider,
                None,
                format!(
                    "empty answer (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        Ok(text)
    }
}

/// Prefer `STATUS: message` from the JSON error envelope, else the raw body
fn describe_error(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{}: {}", status, envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl ProviderAdapter for GeminiClient {
    fn name(&self) -> &str {
        self.provider_type().name()
    }

    async fn invoke(&self, ctx: &CallContext) -> Result<String, ProviderError> {
        let model = self.models.model_for(ctx.model_slot).to_string();
        self.generate(&model, ctx).await
    }
}
