use axum::{Json, extract::State, response::Json as ResponseJson};
use serde::{Deserialize, Serialize};
use services::services::{
    chat::{self, IncomingMessage},
    providers::{
        self,
        openai::{CompletionRequest, OpenAiCompatibleClient},
    },
};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct ChatCompletionBody {
    pub model: Option<String>,
    pub system: Option<String>,
    pub messages: Vec<IncomingMessage>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, TS)]
pub struct ChatCompletionResponse {
    pub content: String,
    pub reasoning: Option<String>,
    pub provider: String,
    pub model: String,
    pub total_tokens: Option<u32>,
}

/// Single-shot completion against whichever provider serves the requested
/// catalog model. Provider settings are built per call from the state's
/// credential source.
pub async fn complete(
    State(state): State<AppState>,
    Json(payload): Json<ChatCompletionBody>,
) -> Result<ResponseJson<ApiResponse<ChatCompletionResponse>>, ApiError> {
    let model_id = payload
        .model
        .unwrap_or_else(|| providers::DEFAULT_MODEL.to_string());
    let model = providers::find_model(&model_id)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown model: {model_id}")))?;

    if payload.messages.is_empty() {
        return Err(ApiError::BadRequest("messages are required".to_string()));
    }

    let messages = payload
        .messages
        .iter()
        .map(|message| (message.role.clone(), incoming_text(message)))
        .collect();

    let settings = providers::settings_for(model.kind, state.credentials());
    let client = OpenAiCompatibleClient::new(state.http().clone());
    let output = client
        .complete(
            &settings,
            &CompletionRequest {
                model: model.upstream_id.clone(),
                system: payload.system,
                messages,
                temperature: payload.temperature,
            },
        )
        .await?;

    let (reasoning, content) = if model.extract_reasoning {
        providers::split_reasoning(&output.content)
    } else {
        (None, output.content)
    };

    Ok(ResponseJson(ApiResponse::success(ChatCompletionResponse {
        content,
        reasoning,
        provider: model.info.provider.clone(),
        model: model.id,
        total_tokens: output.total_tokens,
    })))
}

fn incoming_text(message: &IncomingMessage) -> String {
    chat::message_parts(message)
        .iter()
        .filter_map(|part| match part {
            db::models::message::MessagePart::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
