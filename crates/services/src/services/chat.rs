use chrono::Utc;
use db::models::{
    chat::{Chat, CreateChat},
    message::{CreateMessage, Message, MessagePart, MessageRole},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use thiserror::Error;
use ts_rs::TS;
use utils::ids::new_id;

use crate::services::title;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

#[derive(Debug, Error)]
pub enum ChatServiceError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Chat not found")]
    ChatNotFound,
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Message as the frontend AI layer hands it over. Either `parts` is given
/// directly, or `content` is coerced into parts.
#[derive(Debug, Clone, Deserialize, TS)]
pub struct IncomingMessage {
    pub id: Option<String>,
    pub role: MessageRole,
    pub content: Option<Value>,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct SaveChatParams {
    pub id: Option<String>,
    pub user_id: String,
    pub messages: Option<Vec<IncomingMessage>>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ChatWithMessages {
    #[serde(flatten)]
    pub chat: Chat,
    pub messages: Vec<Message>,
}

/// Normalizes one incoming message to its parts list. Explicit parts win;
/// string content becomes a single text part; an array that parses as parts
/// is taken as-is; anything else is kept as its JSON serialization.
pub fn message_parts(message: &IncomingMessage) -> Vec<MessagePart> {
    if let Some(parts) = &message.parts {
        return parts.clone();
    }
    match &message.content {
        Some(Value::String(text)) => vec![MessagePart::Text { text: text.clone() }],
        Some(Value::Array(items)) => {
            match serde_json::from_value::<Vec<MessagePart>>(Value::Array(items.clone())) {
                Ok(parts) => parts,
                Err(_) => vec![MessagePart::Text {
                    text: Value::Array(items.clone()).to_string(),
                }],
            }
        }
        Some(other) => vec![MessagePart::Text {
            text: other.to_string(),
        }],
        None => Vec::new(),
    }
}

pub fn to_db_messages(incoming: &[IncomingMessage], chat_id: &str) -> Vec<CreateMessage> {
    incoming
        .iter()
        .map(|message| CreateMessage {
            id: message.id.clone().unwrap_or_else(new_id),
            chat_id: chat_id.to_string(),
            role: message.role.clone(),
            parts: message_parts(message),
            created_at: Utc::now(),
        })
        .collect()
}

/// Newline-joined text parts of a stored message.
pub fn text_content(message: &Message) -> String {
    message
        .parts
        .iter()
        .filter_map(|part| match part {
            MessagePart::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Creates the chat row or refreshes its title and timestamp. An explicit
/// title wins unless it is the placeholder; otherwise the title is derived
/// from the messages when there are any.
pub async fn save_chat(pool: &SqlitePool, params: &SaveChatParams) -> Result<Chat, ChatServiceError> {
    let chat_id = params.id.clone().unwrap_or_else(new_id);

    let messages = params
        .messages
        .as_deref()
        .filter(|messages| !messages.is_empty());

    let title = match (&params.title, messages) {
        (Some(title), _) if !title.is_empty() && title != DEFAULT_CHAT_TITLE => title.clone(),
        (_, Some(messages)) => title::generate_title(messages),
        (Some(title), None) if !title.is_empty() => title.clone(),
        _ => DEFAULT_CHAT_TITLE.to_string(),
    };

    let chat = match Chat::find_by_id_and_user(pool, &chat_id, &params.user_id).await? {
        Some(_) => Chat::update_title(pool, &chat_id, &params.user_id, &title).await?,
        None => {
            Chat::create(
                pool,
                &CreateChat {
                    id: chat_id,
                    user_id: params.user_id.clone(),
                    title,
                },
            )
            .await?
        }
    };

    Ok(chat)
}

/// Wholesale-replaces the owning chat's message set. All messages must
/// belong to one chat; the replace itself is transactional.
pub async fn save_messages(
    pool: &SqlitePool,
    messages: &[CreateMessage],
) -> Result<u64, ChatServiceError> {
    let Some(first) = messages.first() else {
        return Ok(0);
    };
    let chat_id = first.chat_id.clone();
    if messages.iter().any(|message| message.chat_id != chat_id) {
        return Err(ChatServiceError::Validation(
            "messages span multiple chats".to_string(),
        ));
    }

    let inserted = Message::replace_for_chat(pool, &chat_id, messages).await?;
    Chat::touch(pool, &chat_id).await?;
    Ok(inserted)
}

pub async fn get_chats(pool: &SqlitePool, user_id: &str) -> Result<Vec<Chat>, ChatServiceError> {
    Ok(Chat::find_all_for_user(pool, user_id).await?)
}

pub async fn get_chat_with_messages(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<ChatWithMessages>, ChatServiceError> {
    let Some(chat) = Chat::find_by_id_and_user(pool, id, user_id).await? else {
        return Ok(None);
    };
    let messages = Message::find_by_chat_id(pool, id).await?;
    Ok(Some(ChatWithMessages { chat, messages }))
}

pub async fn delete_chat(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<(), ChatServiceError> {
    let rows_affected = Chat::delete(pool, id, user_id).await?;
    if rows_affected == 0 {
        return Err(ChatServiceError::ChatNotFound);
    }
    Ok(())
}
