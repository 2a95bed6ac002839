use axum::{
    extract::{Path, Query, Request, State},
    middleware::Next,
    response::Response,
};
use db::models::chat::Chat;
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// Loads the chat addressed by the path, scoped to the requesting user, and
/// makes it available to handlers as an Extension.
pub async fn load_chat_middleware(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(query): Query<UserQuery>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let chat = Chat::find_by_id_and_user(&state.db().pool, &chat_id, &query.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Chat not found".to_string()))?;
    request.extensions_mut().insert(chat);
    Ok(next.run(request).await)
}
