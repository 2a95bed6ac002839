use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    chat::ChatServiceError, mcp::McpError, providers::openai::ProviderError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Chat(#[from] ChatServiceError),
    #[error(transparent)]
    Mcp(#[from] McpError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Chat(ChatServiceError::ChatNotFound) => StatusCode::NOT_FOUND,
            ApiError::Chat(ChatServiceError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Chat(ChatServiceError::Database(sqlx::Error::RowNotFound)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Chat(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Mcp(McpError::ServerNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Mcp(McpError::MissingCommand(_)) => StatusCode::BAD_REQUEST,
            ApiError::Mcp(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        };

        if status.is_server_error() {
            tracing::error!("api error: {self}");
        }

        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
