//! Chat turn handler
//!
//! Validates the turn, picks models and a handler, then streams the answer
//! back as NDJSON while history is written in the background.

use axum::{
    body::{Body, Bytes},
    http::StatusCode,
    response::Response,
    Extension,
};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::state::AppState;
use super::validation::parse_chat_request;
use crate::answer::AnswerRequest;
use crate::domain::services::{spawn_turn, FrameSink, StreamBridge, TurnTask};
use crate::shared::errors::{AppError, CHAT_REQUEST_FAILED};
use crate::shared::logging;

/// POST /api/chat
pub async fn chat_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = parse_chat_request(&body).map_err(AppError::Validation)?;

    let chat_model = state.models.resolve_chat(&request.chat_model)?;
    let embedding_model = state.models.resolve_embedding(&request.embedding_model)?;

    let handler = state.handlers.dispatch(&request.focus_mode).inspect_err(|e| {
        logging::log_dispatch_rejected(&request.focus_mode, &e.to_string());
    })?;

    logging::log_turn_start(
        &request.turn.chat_id,
        &request.turn.message_id,
        &request.focus_mode,
        handler.name(),
    );

    let system_instructions = request
        .system_instructions
        .clone()
        .unwrap_or_else(|| state.default_system_instructions.clone());

    let stream = handler
        .search_and_answer(AnswerRequest {
            query: request.turn.content.clone(),
            history: request.history,
            chat_model,
            embedding_model,
            optimization_mode: request.optimization_mode,
            file_ids: request.files.clone(),
            system_instructions,
        })
        .await?;

    let bridge = StreamBridge::new(state.store.clone(), &request.turn.chat_id);
    let (sink, rx) = FrameSink::channel();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/x-ndjson")
        .header("Transfer-Encoding", "chunked")
        .header("Cache-Control", "no-cache")
        .header("X-Message-Id", bridge.assistant_message_id())
        .body(Body::from_stream(UnboundedReceiverStream::new(rx)))
        .map_err(|e| AppError::internal(CHAT_REQUEST_FAILED, e))?;

    spawn_turn(
        state.reconciler(),
        TurnTask {
            turn: request.turn,
            focus_mode: request.focus_mode,
            file_ids: request.files,
            bridge,
            stream,
            sink,
        },
    );

    Ok(response)
}
