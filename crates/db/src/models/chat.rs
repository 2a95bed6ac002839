use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Chat {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateChat {
    pub id: String,
    pub user_id: String,
    pub title: String,
}

impl Chat {
    pub async fn find_all_for_user(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Chat>(
            r#"SELECT id, user_id, title, created_at, updated_at
               FROM chats
               WHERE user_id = $1
               ORDER BY updated_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id_and_user(
        pool: &SqlitePool,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Chat>(
            r#"SELECT id, user_id, title, created_at, updated_at
               FROM chats
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateChat) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Chat>(
            r#"INSERT INTO chats (id, user_id, title)
               VALUES ($1, $2, $3)
               RETURNING id, user_id, title, created_at, updated_at"#,
        )
        .bind(&data.id)
        .bind(&data.user_id)
        .bind(&data.title)
        .fetch_one(pool)
        .await
    }

    pub async fn update_title(
        pool: &SqlitePool,
        id: &str,
        user_id: &str,
        title: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Chat>(
            r#"UPDATE chats
               SET title = $3,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, title, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .fetch_one(pool)
        .await
    }

    pub async fn touch(pool: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE chats SET updated_at = datetime('now', 'subsec') WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: &str, user_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    async fn test_pool() -> SqlitePool {
        DBService::new_in_memory().await.unwrap().pool
    }

    fn chat_data(id: &str, user_id: &str, title: &str) -> CreateChat {
        CreateChat {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_find_scoped_by_user() {
        let pool = test_pool().await;
        let created = Chat::create(&pool, &chat_data("c1", "alice", "Hello")).await.unwrap();
        assert_eq!(created.id, "c1");
        assert_eq!(created.title, "Hello");

        let found = Chat::find_by_id_and_user(&pool, "c1", "alice").await.unwrap();
        assert!(found.is_some());

        let other_user = Chat::find_by_id_and_user(&pool, "c1", "bob").await.unwrap();
        assert!(other_user.is_none());
    }

    #[tokio::test]
    async fn listing_orders_by_most_recently_updated() {
        let pool = test_pool().await;
        Chat::create(&pool, &chat_data("older", "alice", "First")).await.unwrap();
        Chat::create(&pool, &chat_data("newer", "alice", "Second")).await.unwrap();

        // The timestamp column has millisecond resolution; put the touch
        // clearly after both inserts.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        Chat::touch(&pool, "older").await.unwrap();

        let chats = Chat::find_all_for_user(&pool, "alice").await.unwrap();
        let ids: Vec<&str> = chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["older", "newer"]);
    }

    #[tokio::test]
    async fn update_title_replaces_title() {
        let pool = test_pool().await;
        Chat::create(&pool, &chat_data("c1", "alice", "New Chat")).await.unwrap();
        let updated = Chat::update_title(&pool, "c1", "alice", "Renamed").await.unwrap();
        assert_eq!(updated.title, "Renamed");
    }

    #[tokio::test]
    async fn delete_reports_rows_affected() {
        let pool = test_pool().await;
        Chat::create(&pool, &chat_data("c1", "alice", "Hello")).await.unwrap();
        assert_eq!(Chat::delete(&pool, "c1", "alice").await.unwrap(), 1);
        assert_eq!(Chat::delete(&pool, "c1", "alice").await.unwrap(), 0);
    }
}
