//! Answer handler trait and the event stream it produces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::models::{
    ChatModel, Citation, EmbeddingModel, HistoryEntry, OptimizationMode,
};

/// Buffer size for handler event channels
pub const ANSWER_CHANNEL_CAPACITY: usize = 256;

/// Event emitted while an answer is being produced
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerEvent {
    /// Text fragment of the answer
    Response(String),
    /// Citations backing the answer
    Sources(Vec<Citation>),
    /// Answer complete; no further events follow
    End,
    /// Answer failed; no further events follow
    Error(String),
}

impl AnswerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AnswerEvent::Response(_) => "response",
            AnswerEvent::Sources(_) => "sources",
            AnswerEvent::End => "end",
            AnswerEvent::Error(_) => "error",
        }
    }
}

/// Errors raised while starting an answer
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Failed to start answer: {0}")]
    StartFailed(String),

    #[error("Model not supported by this handler: {0}")]
    UnsupportedModel(String),
}

/// Everything a handler needs to answer one turn
#[derive(Debug, Clone)]
pub struct AnswerRequest {
    pub query: String,
    pub history: Vec<HistoryEntry>,
    pub chat_model: ChatModel,
    pub embedding_model: EmbeddingModel,
    pub optimization_mode: OptimizationMode,
    pub file_ids: Vec<String>,
    pub system_instructions: String,
}

/// Receiving half of a running answer (single consumer)
pub struct AnswerStream {
    rx: mpsc::Receiver<AnswerEvent>,
}

impl AnswerStream {
    /// Create a connected sender/stream pair
    pub fn channel(capacity: usize) -> (AnswerSender, AnswerStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (AnswerSender { tx }, AnswerStream { rx })
    }

    /// Stream that replays a fixed list of events, then finishes
    pub fn from_events(events: Vec<AnswerEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity covers every event, so this cannot be full
            let _ = tx.try_send(event);
        }
        Self { rx }
    }

    /// Receive the next event; `None` once the producer is gone
    pub async fn recv(&mut self) -> Option<AnswerEvent> {
        self.rx.recv().await
    }
}

/// Producing half of a running answer
#[derive(Clone)]
pub struct AnswerSender {
    tx: mpsc::Sender<AnswerEvent>,
}

impl AnswerSender {
    /// Send an event; returns false once the consumer has gone away
    pub async fn send(&self, event: AnswerEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    pub async fn response(&self, text: impl Into<String>) -> bool {
        self.send(AnswerEvent::Response(text.into())).await
    }

    pub async fn end(&self) -> bool {
        self.send(AnswerEvent::End).await
    }

    pub async fn error(&self, message: impl Into<String>) -> bool {
        self.send(AnswerEvent::Error(message.into())).await
    }
}

/// Trait for answer-producing handlers, one per focus mode
#[async_trait]
pub trait AnswerHandler: Send + Sync {
    /// Human-readable handler name (for logs)
    fn name(&self) -> &'static str;

    /// Start answering. Returns as soon as the stream exists; events arrive
    /// as the answer is produced.
    async fn search_and_answer(&self, request: AnswerRequest) -> Result<AnswerStream, HandlerError>;
}
