use axum::{extract::Path, Extension, Json};
use serde::Serialize;

use super::state::AppState;
use crate::domain::models::{Chat, Message};
use crate::infrastructure::StoreError;
use crate::shared::errors::AppError;

#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<Chat>,
}

#[derive(Debug, Serialize)]
pub struct ChatDetailResponse {
    pub chat: Chat,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/chats
/// All chats, newest first
pub async fn list_chats_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<ChatListResponse>, AppError> {
    let mut chats = state
        .store
        .list_chats()
        .await
        .map_err(|e| AppError::internal("An error occurred while fetching chats", e))?;
    chats.reverse();

    Ok(Json(ChatListResponse { chats }))
}

/// GET /api/chats/{id}
pub async fn get_chat_handler(
    Extension(state): Extension<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDetailResponse>, AppError> {
    let fetch_failed = |e: StoreError| AppError::internal("An error occurred while fetching chat", e);

    let chat = state
        .store
        .find_chat(&chat_id)
        .await
        .map_err(fetch_failed)?
        .ok_or_else(|| AppError::ChatNotFound(chat_id.clone()))?;

    let messages = state
        .store
        .list_messages(&chat_id)
        .await
        .map_err(fetch_failed)?;

    Ok(Json(ChatDetailResponse { chat, messages }))
}

/// DELETE /api/chats/{id}
/// Deletes the chat and all its messages
pub async fn delete_chat_handler(
    Extension(state): Extension<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = state
        .store
        .delete_chat(&chat_id)
        .await
        .map_err(|e| AppError::internal("An error occurred while deleting chat", e))?;

    if !deleted {
        return Err(AppError::ChatNotFound(chat_id));
    }

    tracing::info!(chat_id = %chat_id, "Chat deleted");
    Ok(Json(MessageResponse {
        message: "Chat deleted successfully",
    }))
}
