// Shadow-Instructor: Fallback Call Adapter (Groq, OpenAI-compatible chat completions)
// The secondary provider has no schema primitive: the JSON contract is inlined
// into the system message and the reply is validated after parsing.

use super::provider::{CallContext, Message, Modality, ProviderAdapter, ProviderType, Role};
use crate::config::GroqConfig;
use crate::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: ChatContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl From<Message> for ChatMessage {
    fn from(msg: Message) -> Self {
        Self {
            role: msg.role,
            content: ChatContent::Text(msg.content),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// The JSON-only instruction that stands in for native schema enforcement
pub fn json_contract(schema_name: &str, schema: &Value) -> String {
    let rendered = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "Respond with ONLY a valid JSON object matching the {} schema below. \
         JSON only, no markdown, no code fences, no commentary. \
         Use the exact field names and enum values shown.\nSchema:\n{}",
        schema_name, rendered
    )
}

#[derive(Debug, Clone)]
pub struct GroqClient {
    http: Client,
    api_key: String,
    model: String,
    vision_model: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(http: Client, config: &GroqConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Collapse system instruction, JSON contract and prompt into the flat chat format
    pub fn build_request(&self, ctx: &CallContext) -> Result<ChatCompletionRequest, ProviderError> {
        let provider = ProviderType::Groq.name();

        let mut system = ctx.system_instruction.trim().to_string();
        if let (Some(schema), Some(name)) = (&ctx.response_schema, ctx.schema_name) {
            if !system.is_empty() {
                system.push_str("\n\n");
            }
            system.push_str(&json_contract(name, schema));
        }

        let (model, user) = match ctx.modality() {
            Modality::Text => (&self.model, ChatContent::Text(ctx.prompt.clone())),
            Modality::TextAndImage => {
                let image = ctx.attachment.as_ref().map(|a| a.data_uri()).unwrap_or_default();
                (
                    &self.vision_model,
                    ChatContent::Parts(vec![
                        ContentPart::Text { text: ctx.prompt.clone() },
                        ContentPart::ImageUrl { image_url: ImageUrl { url: image } },
                    ]),
                )
            }
            Modality::TextAndDocument => {
                let mime = ctx.attachment.as_ref().map(|a| a.mime_type.as_str()).unwrap_or("document");
                let text = ctx.fallback_text.as_deref().ok_or_else(|| {
                    ProviderError::new(
                        provider,
                        None,
                        format!("cannot read {} attachments and no extracted text was supplied", mime),
                    )
                })?;
                (
                    &self.model,
                    ChatContent::Text(format!("{}\n\nDOCUMENT TEXT:\n{}", ctx.prompt, text)),
                )
            }
        };

        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(ChatMessage::from(Message::system(&system)));
        }
        messages.push(ChatMessage { role: Role::User, content: user });

        Ok(ChatCompletionRequest {
            model: model.clone(),
            messages,
            temperature: ctx.temperature,
            response_format: ctx.is_structured().then(|| json!({ "type": "json_object" })),
        })
    }

    async fn complete(&self, body: &ChatCompletionRequest) -> Result<String, ProviderError> {
        let provider = ProviderType::Groq.name();

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(provider, e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ProviderError::new(provider, Some(status.as_u16()), message));
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(provider, None, format!("unreadable response: {}", e.without_url())))?;

        if let Some(usage) = &data.usage {
            log::info!("Fallback request completed. Used {} tokens", usage.total_tokens);
        }

        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::new(provider, None, "no choices returned in response"))
    }
}

#[async_trait]
impl ProviderAdapter for GroqClient {
    fn name(&self) -> &str {
        ProviderType::Groq.name()
    }

    async fn invoke(&self, ctx: &CallContext) -> Result<String, ProviderError> {
        let body = self.build_request(ctx)?;
        log::debug!("groq call: model={} task={:?}", body.model, ctx.task);
        self.complete(&body).await
    }
}
