pub mod chat_completion;
pub mod chats;
pub mod mcp;
pub mod messages;
pub mod models;
pub mod ready;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};

use crate::{AppState, middleware::load_chat_middleware};

pub fn router(state: &AppState) -> Router<AppState> {
    let chat_router = Router::new()
        .route("/", get(chats::get_chat).delete(chats::delete_chat))
        .route(
            "/messages",
            get(messages::get_messages).post(messages::save_messages),
        )
        .layer(from_fn_with_state(state.clone(), load_chat_middleware));

    let chats_router = Router::new()
        .route("/", get(chats::get_chats).post(chats::save_chat))
        .nest("/{chat_id}", chat_router);

    let mcp_router = Router::new()
        .route("/servers", get(mcp::get_servers).post(mcp::upsert_server))
        .route("/servers/{server_id}", delete(mcp::delete_server))
        .route("/servers/{server_id}/start", post(mcp::start_server))
        .route("/servers/{server_id}/stop", post(mcp::stop_server))
        .route("/selection", put(mcp::set_selection))
        .route("/active", get(mcp::get_active_servers));

    Router::new()
        .nest("/chats", chats_router)
        .nest("/mcp", mcp_router)
        .route("/chat", post(chat_completion::complete))
        .route("/models", get(models::get_models))
        .route("/server/ready", post(ready::check_server_ready))
}
