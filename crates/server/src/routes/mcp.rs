use axum::{
    Json,
    extract::{Path, State},
    response::Json as ResponseJson,
};
use serde::{Deserialize, Serialize};
use services::services::mcp::{McpServerApi, McpServerConfig, McpServerState};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct SelectionRequest {
    pub server_ids: Vec<String>,
}

#[derive(Debug, Serialize, TS)]
pub struct StartServerResponse {
    pub connected: bool,
}

pub async fn get_servers(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<McpServerState>>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(state.mcp().list())))
}

pub async fn upsert_server(
    State(state): State<AppState>,
    Json(payload): Json<McpServerConfig>,
) -> Result<ResponseJson<ApiResponse<McpServerState>>, ApiError> {
    if payload.id.is_empty() {
        return Err(ApiError::BadRequest("server id is required".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(
        state.mcp().upsert(payload),
    )))
}

pub async fn delete_server(
    State(state): State<AppState>,
    Path(server_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.mcp().remove(&server_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn start_server(
    State(state): State<AppState>,
    Path(server_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<StartServerResponse>>, ApiError> {
    let connected = state.mcp().start_server(&server_id).await?;
    Ok(ResponseJson(ApiResponse::success(StartServerResponse {
        connected,
    })))
}

pub async fn stop_server(
    State(state): State<AppState>,
    Path(server_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.mcp().stop_server(&server_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn set_selection(
    State(state): State<AppState>,
    Json(payload): Json<SelectionRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.mcp().set_selection(payload.server_ids).await;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_active_servers(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<McpServerApi>>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(
        state.mcp().active_servers_for_api().await,
    )))
}
