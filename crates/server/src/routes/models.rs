use axum::response::Json as ResponseJson;
use serde::Serialize;
use services::services::providers::{self, CatalogModel};
use ts_rs::TS;
use utils::response::ApiResponse;

#[derive(Debug, Serialize, TS)]
pub struct ModelsResponse {
    pub models: Vec<CatalogModel>,
    pub default_model: String,
}

pub async fn get_models() -> ResponseJson<ApiResponse<ModelsResponse>> {
    ResponseJson(ApiResponse::success(ModelsResponse {
        models: providers::catalog(),
        default_model: providers::DEFAULT_MODEL.to_string(),
    }))
}
