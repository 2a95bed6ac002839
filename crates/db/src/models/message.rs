use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use ts_rs::TS;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
            MessageRole::Tool => "tool",
        }
    }
}

/// One typed segment of a message body: plain text or an image reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessagePart {
    Text { text: String },
    Image { image_url: String },
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub role: MessageRole,
    #[ts(type = "MessagePart[]")]
    pub parts: sqlx::types::Json<Vec<MessagePart>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateMessage {
    pub id: String,
    pub chat_id: String,
    pub role: MessageRole,
    pub parts: Vec<MessagePart>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub async fn find_by_chat_id(
        pool: &SqlitePool,
        chat_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Message>(
            r#"SELECT id, chat_id, role, parts, created_at
               FROM messages
               WHERE chat_id = $1
               ORDER BY created_at ASC, rowid ASC"#,
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await
    }

    /// Replaces the chat's whole message set in one transaction, so readers
    /// never observe a chat stripped of its old messages but missing its new
    /// ones. Returns the number of messages inserted.
    pub async fn replace_for_chat(
        pool: &SqlitePool,
        chat_id: &str,
        messages: &[CreateMessage],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM messages WHERE chat_id = $1")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?;

        let mut inserted = 0;
        for message in messages {
            sqlx::query(
                r#"INSERT INTO messages (id, chat_id, role, parts, created_at)
                   VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(&message.id)
            .bind(chat_id)
            .bind(&message.role)
            .bind(sqlx::types::Json(&message.parts))
            .bind(message.created_at)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn count_for_chat(pool: &SqlitePool, chat_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;
    use crate::models::chat::{Chat, CreateChat};

    async fn pool_with_chat(chat_id: &str) -> SqlitePool {
        let pool = DBService::new_in_memory().await.unwrap().pool;
        Chat::create(
            &pool,
            &CreateChat {
                id: chat_id.to_string(),
                user_id: "alice".to_string(),
                title: "New Chat".to_string(),
            },
        )
        .await
        .unwrap();
        pool
    }

    fn text_message(id: &str, chat_id: &str, text: &str) -> CreateMessage {
        CreateMessage {
            id: id.to_string(),
            chat_id: chat_id.to_string(),
            role: MessageRole::User,
            parts: vec![MessagePart::Text {
                text: text.to_string(),
            }],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn replace_preserves_batch_order() {
        let pool = pool_with_chat("c1").await;
        let batch = vec![
            text_message("m1", "c1", "first"),
            text_message("m2", "c1", "second"),
            text_message("m3", "c1", "third"),
        ];
        assert_eq!(Message::replace_for_chat(&pool, "c1", &batch).await.unwrap(), 3);

        let messages = Message::find_by_chat_id(&pool, "c1").await.unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn replace_is_wholesale() {
        let pool = pool_with_chat("c1").await;
        let first = vec![text_message("m1", "c1", "old")];
        Message::replace_for_chat(&pool, "c1", &first).await.unwrap();

        let second = vec![
            text_message("m2", "c1", "new"),
            text_message("m3", "c1", "newer"),
        ];
        Message::replace_for_chat(&pool, "c1", &second).await.unwrap();

        let messages = Message::find_by_chat_id(&pool, "c1").await.unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m3"]);
    }

    #[tokio::test]
    async fn failed_replace_leaves_previous_messages_intact() {
        let pool = pool_with_chat("c1").await;
        let original = vec![text_message("m1", "c1", "keep me")];
        Message::replace_for_chat(&pool, "c1", &original).await.unwrap();

        // Duplicate primary key makes the second insert fail mid-batch; the
        // transaction must roll the delete back with it.
        let bad_batch = vec![
            text_message("m2", "c1", "new"),
            text_message("m2", "c1", "duplicate id"),
        ];
        let result = Message::replace_for_chat(&pool, "c1", &bad_batch).await;
        assert!(result.is_err());

        let messages = Message::find_by_chat_id(&pool, "c1").await.unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1"]);
    }

    #[tokio::test]
    async fn deleting_chat_cascades_to_messages() {
        let pool = pool_with_chat("c1").await;
        let batch = vec![text_message("m1", "c1", "hello")];
        Message::replace_for_chat(&pool, "c1", &batch).await.unwrap();

        Chat::delete(&pool, "c1", "alice").await.unwrap();
        assert_eq!(Message::count_for_chat(&pool, "c1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn parts_round_trip_through_json_column() {
        let pool = pool_with_chat("c1").await;
        let batch = vec![CreateMessage {
            id: "m1".to_string(),
            chat_id: "c1".to_string(),
            role: MessageRole::Assistant,
            parts: vec![
                MessagePart::Text {
                    text: "look at this".to_string(),
                },
                MessagePart::Image {
                    image_url: "https://example.com/cat.png".to_string(),
                },
            ],
            created_at: Utc::now(),
        }];
        Message::replace_for_chat(&pool, "c1", &batch).await.unwrap();

        let messages = Message::find_by_chat_id(&pool, "c1").await.unwrap();
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert_eq!(messages[0].parts.0, batch[0].parts);
    }
}
