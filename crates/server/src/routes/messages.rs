use axum::{
    Extension, Json,
    extract::State,
    response::Json as ResponseJson,
};
use db::models::{chat::Chat, message::Message};
use serde::{Deserialize, Serialize};
use services::services::chat::{self, IncomingMessage};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct SaveMessagesRequest {
    pub messages: Vec<IncomingMessage>,
}

#[derive(Debug, Serialize, TS)]
pub struct SaveMessagesResponse {
    pub saved: u64,
}

pub async fn get_messages(
    Extension(chat): Extension<Chat>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Message>>>, ApiError> {
    let messages = Message::find_by_chat_id(&state.db().pool, &chat.id).await?;
    Ok(ResponseJson(ApiResponse::success(messages)))
}

/// Replaces the chat's message set wholesale with the posted messages.
pub async fn save_messages(
    Extension(chat): Extension<Chat>,
    State(state): State<AppState>,
    Json(payload): Json<SaveMessagesRequest>,
) -> Result<ResponseJson<ApiResponse<SaveMessagesResponse>>, ApiError> {
    let db_messages = chat::to_db_messages(&payload.messages, &chat.id);
    let saved = chat::save_messages(&state.db().pool, &db_messages).await?;
    Ok(ResponseJson(ApiResponse::success(SaveMessagesResponse {
        saved,
    })))
}
