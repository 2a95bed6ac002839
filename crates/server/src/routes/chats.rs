use axum::{
    Extension, Json,
    extract::{Query, State},
    response::Json as ResponseJson,
};
use db::models::chat::Chat;
use serde::Deserialize;
use services::services::chat::{self, ChatServiceError, ChatWithMessages, SaveChatParams};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct ChatListQuery {
    pub user_id: String,
}

pub async fn get_chats(
    State(state): State<AppState>,
    Query(query): Query<ChatListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Chat>>>, ApiError> {
    let chats = chat::get_chats(&state.db().pool, &query.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(chats)))
}

pub async fn save_chat(
    State(state): State<AppState>,
    Json(payload): Json<SaveChatParams>,
) -> Result<ResponseJson<ApiResponse<Chat>>, ApiError> {
    let saved = chat::save_chat(&state.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(saved)))
}

pub async fn get_chat(
    Extension(chat): Extension<Chat>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<ChatWithMessages>>, ApiError> {
    let with_messages = chat::get_chat_with_messages(&state.db().pool, &chat.id, &chat.user_id)
        .await?
        .ok_or(ApiError::Chat(ChatServiceError::ChatNotFound))?;
    Ok(ResponseJson(ApiResponse::success(with_messages)))
}

pub async fn delete_chat(
    Extension(chat): Extension<Chat>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    chat::delete_chat(&state.db().pool, &chat.id, &chat.user_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}
