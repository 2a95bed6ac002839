use db::models::message::MessageRole;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ProviderSettings;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model id as the upstream API knows it.
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<(MessageRole, String)>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub total_tokens: Option<u32>,
}

/// Chat client for any OpenAI-compatible endpoint. Which endpoint and with
/// which credentials is decided per call by the `ProviderSettings`.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    http: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub async fn complete(
        &self,
        settings: &ProviderSettings,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let endpoint = format!("{}/chat/completions", settings.base_url);

        let mut messages = Vec::new();
        if let Some(system) = request.system.as_deref() {
            if !system.trim().is_empty() {
                messages.push(OpenAiMessage {
                    role: "system",
                    content: system.to_string(),
                });
            }
        }
        messages.extend(request.messages.iter().map(|(role, content)| OpenAiMessage {
            role: role.as_str(),
            content: content.clone(),
        }));

        let payload = OpenAiChatRequest {
            model: request.model.clone(),
            messages,
            stream: false,
            temperature: request.temperature,
        };

        let mut builder = self.http.post(&endpoint).json(&payload);
        if !settings.query_params.is_empty() {
            builder = builder.query(&settings.query_params);
        }
        if let Some(api_key) = &settings.api_key {
            builder = builder.bearer_auth(api_key);
        }
        for (name, value) in &settings.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let output: OpenAiChatResponse = response.json().await?;
        let content = output
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        if content.is_empty() {
            tracing::warn!(model = %request.model, "empty completion content");
        }

        Ok(CompletionResponse {
            content,
            model: request.model.clone(),
            total_tokens: output.usage.and_then(|usage| usage.total_tokens),
        })
    }
}

#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiAssistantMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiAssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    total_tokens: Option<u32>,
}
