/// Chat turn streaming
pub mod chat;

/// Stored chat history (list, detail, delete)
pub mod chats;

/// Model catalog listing
pub mod models;

pub mod state;
pub mod validation;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use chat::chat_handler;
pub use chats::{delete_chat_handler, get_chat_handler, list_chats_handler};
pub use models::list_models_handler;
pub use state::AppState;
pub use validation::{parse_chat_request, ChatRequest};

/// Build the API router
// NOTE: Axum 0.8 uses {param} syntax instead of :param
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/chats", get(list_chats_handler))
        .route(
            "/api/chats/{id}",
            get(get_chat_handler).delete(delete_chat_handler),
        )
        .route("/api/models", get(list_models_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
