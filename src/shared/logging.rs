//! Structured logging for the turn pipeline
//!
//! Provides consistent, contextual logging across the application.
//! Every event carries an `operation` field plus the chat/message ids it concerns.

/// Pipeline stages that emit log events
#[derive(Debug, Clone, Copy)]
pub enum LogOperation {
    Turn,
    Dispatch,
    Reconcile,
    Relay,
    Persist,
}

impl LogOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOperation::Turn => "turn",
            LogOperation::Dispatch => "dispatch",
            LogOperation::Reconcile => "reconcile",
            LogOperation::Relay => "relay",
            LogOperation::Persist => "persist",
        }
    }
}

/// Log an accepted turn
pub fn log_turn_start(chat_id: &str, message_id: &str, focus_mode: &str, handler: &str) {
    tracing::info!(
        operation = LogOperation::Turn.as_str(),
        chat_id = chat_id,
        message_id = message_id,
        focus_mode = focus_mode,
        handler = handler,
        "Starting turn"
    );
}

/// Log a turn rejected before streaming began
pub fn log_dispatch_rejected(focus_mode: &str, reason: &str) {
    tracing::warn!(
        operation = LogOperation::Dispatch.as_str(),
        focus_mode = focus_mode,
        reason = reason,
        "Turn rejected"
    );
}

/// Log reconciliation result
pub fn log_reconcile_result(
    chat_id: &str,
    message_id: &str,
    created_chat: bool,
    resubmission: bool,
    removed_messages: usize,
) {
    tracing::info!(
        operation = LogOperation::Reconcile.as_str(),
        chat_id = chat_id,
        message_id = message_id,
        created_chat = created_chat,
        resubmission = resubmission,
        removed_messages = removed_messages,
        "History reconciled"
    );
}

/// Log reconciliation failure
pub fn log_reconcile_error(chat_id: &str, message_id: &str, error: &str) {
    tracing::error!(
        operation = LogOperation::Reconcile.as_str(),
        chat_id = chat_id,
        message_id = message_id,
        error = error,
        "Failed to reconcile history"
    );
}

/// Log a swallowed persistence failure
pub fn log_persist_error(chat_id: &str, message_id: &str, role: &str, error: &str) {
    tracing::error!(
        operation = LogOperation::Persist.as_str(),
        chat_id = chat_id,
        message_id = message_id,
        role = role,
        error = error,
        "Failed to persist message"
    );
}

/// Log the client going away mid-stream
pub fn log_client_disconnected(chat_id: &str, message_id: &str) {
    tracing::debug!(
        operation = LogOperation::Relay.as_str(),
        chat_id = chat_id,
        message_id = message_id,
        "Client disconnected, continuing for persistence only"
    );
}

/// Log an event received after the stream already terminated
pub fn log_event_after_termination(chat_id: &str, message_id: &str, event: &str) {
    tracing::warn!(
        operation = LogOperation::Relay.as_str(),
        chat_id = chat_id,
        message_id = message_id,
        event = event,
        "Ignoring event after stream termination"
    );
}

/// Log an answer stream that stopped without end or error
pub fn log_stream_incomplete(chat_id: &str, message_id: &str) {
    tracing::warn!(
        operation = LogOperation::Relay.as_str(),
        chat_id = chat_id,
        message_id = message_id,
        "Answer stream ended without a terminal event"
    );
}

/// Log turn completion
pub fn log_turn_finished(chat_id: &str, message_id: &str, outcome: &str, answer_len: usize) {
    tracing::info!(
        operation = LogOperation::Turn.as_str(),
        chat_id = chat_id,
        message_id = message_id,
        outcome = outcome,
        answer_len = answer_len,
        "Turn finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_operation_as_str() {
        assert_eq!(LogOperation::Turn.as_str(), "turn");
        assert_eq!(LogOperation::Dispatch.as_str(), "dispatch");
        assert_eq!(LogOperation::Reconcile.as_str(), "reconcile");
        assert_eq!(LogOperation::Relay.as_str(), "relay");
        assert_eq!(LogOperation::Persist.as_str(), "persist");
    }
}
