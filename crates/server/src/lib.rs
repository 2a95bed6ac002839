use std::sync::Arc;

use axum::Router;
use db::DBService;
use services::services::{mcp::McpManager, providers::Credentials, readiness::ReadinessConfig};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod middleware;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    db: DBService,
    mcp: Arc<McpManager>,
    credentials: Credentials,
    http: reqwest::Client,
    readiness: ReadinessConfig,
}

impl AppState {
    pub fn new(db: DBService, credentials: Credentials) -> Self {
        Self::with_readiness(db, credentials, ReadinessConfig::default())
    }

    pub fn with_readiness(
        db: DBService,
        credentials: Credentials,
        readiness: ReadinessConfig,
    ) -> Self {
        let http = reqwest::Client::new();
        let mcp = Arc::new(McpManager::new(http.clone(), readiness.clone()));
        Self {
            db,
            mcp,
            credentials,
            http,
            readiness,
        }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn mcp(&self) -> &McpManager {
        &self.mcp
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn readiness(&self) -> &ReadinessConfig {
        &self.readiness
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::router(&state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
