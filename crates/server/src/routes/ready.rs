use std::time::Duration;

use axum::{Json, extract::State, response::Json as ResponseJson};
use serde::{Deserialize, Serialize};
use services::services::readiness;
use ts_rs::TS;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ServerReadyRequest {
    pub url: Option<String>,
    pub max_attempts: Option<u32>,
    /// Per-probe timeout in milliseconds.
    pub timeout: Option<u64>,
}

#[derive(Debug, Serialize, TS)]
pub struct ServerReadyResponse {
    pub ready: bool,
}

/// Probes the given URL until it answers 200 or the attempt budget runs
/// out. Expected failures (non-200, timeouts, refused connections) only
/// ever show up as `ready: false`.
pub async fn check_server_ready(
    State(state): State<AppState>,
    Json(payload): Json<ServerReadyRequest>,
) -> Result<ResponseJson<ServerReadyResponse>, ApiError> {
    let Some(url) = payload.url.filter(|url| !url.is_empty()) else {
        return Err(ApiError::BadRequest("URL is required".to_string()));
    };

    let mut config = state.readiness().clone();
    if let Some(max_attempts) = payload.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(timeout) = payload.timeout {
        config.attempt_timeout = Duration::from_millis(timeout);
    }

    let ready = readiness::wait_until_ready(state.http(), &url, &config).await;
    Ok(ResponseJson(ServerReadyResponse { ready }))
}
