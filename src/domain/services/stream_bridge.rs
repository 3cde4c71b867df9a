//! Relays an answer stream to the client as NDJSON frames
//!
//! The bridge is the single consumer of a handler's [`AnswerStream`]. Each
//! event becomes one framed record on the client connection, in arrival
//! order. Source and assistant messages are handed to a persistence worker
//! that writes them one at a time, so the relay never waits on storage and
//! storage writes keep the order the events arrived in.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::answer::{AnswerEvent, AnswerStream};
use crate::domain::models::{generate_message_id, NewMessage, StreamFrame};
use crate::infrastructure::ChatStore;
use crate::shared::logging;

/// Error frame sent when the answer stream stops without `end` or `error`
pub const STREAM_ENDED_UNEXPECTEDLY: &str = "Answer stream ended unexpectedly";

/// One chunk of the chunked response body
pub type FrameChunk = Result<String, std::io::Error>;

/// Write side of the client connection.
///
/// Writes after [`FrameSink::close`] or after the client went away are no-ops.
pub struct FrameSink {
    tx: Option<mpsc::UnboundedSender<FrameChunk>>,
}

impl FrameSink {
    /// Create a sink and the receiver that feeds the response body
    pub fn channel() -> (FrameSink, mpsc::UnboundedReceiver<FrameChunk>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (FrameSink { tx: Some(tx) }, rx)
    }

    /// Write one frame as a newline-terminated JSON line.
    /// Returns false when the connection is closed.
    pub fn send(&mut self, frame: &StreamFrame) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };

        let line = match frame.to_ndjson() {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to serialize frame: {}", e);
                return true;
            }
        };

        if tx.send(Ok(format!("{}\n", line))).is_err() {
            self.tx = None;
            return false;
        }
        true
    }

    pub fn close(&mut self) {
        self.tx = None;
    }

    pub fn is_open(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

/// How a relayed answer ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// `end` received; `content` is the full answer text
    Completed { content: String },
    /// `error` received; nothing was persisted
    Failed { error: String },
    /// The stream stopped without a terminal event; nothing was persisted
    Interrupted,
}

impl BridgeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeOutcome::Completed { .. } => "completed",
            BridgeOutcome::Failed { .. } => "failed",
            BridgeOutcome::Interrupted => "interrupted",
        }
    }
}

/// Sequential writer for the messages a turn produces
fn spawn_persist_worker(
    store: Arc<dyn ChatStore>,
) -> (mpsc::UnboundedSender<NewMessage>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<NewMessage>();

    let handle = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let chat_id = message.chat_id.clone();
            let message_id = message.message_id.clone();
            let role = message.role;

            if let Err(e) = store.insert_message(message).await {
                logging::log_persist_error(&chat_id, &message_id, role.as_str(), &e.to_string());
            }
        }
    });

    (tx, handle)
}

/// Per-turn relay state
pub struct StreamBridge {
    store: Arc<dyn ChatStore>,
    chat_id: String,
    assistant_message_id: String,
}

impl StreamBridge {
    /// New bridge with a freshly generated assistant message id
    pub fn new(store: Arc<dyn ChatStore>, chat_id: impl Into<String>) -> Self {
        Self::with_message_id(store, chat_id, generate_message_id())
    }

    pub fn with_message_id(
        store: Arc<dyn ChatStore>,
        chat_id: impl Into<String>,
        assistant_message_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            chat_id: chat_id.into(),
            assistant_message_id: assistant_message_id.into(),
        }
    }

    pub fn assistant_message_id(&self) -> &str {
        &self.assistant_message_id
    }

    fn relay(&self, sink: &mut FrameSink, frame: StreamFrame) {
        let was_open = sink.is_open();
        if !sink.send(&frame) && was_open {
            logging::log_client_disconnected(&self.chat_id, &self.assistant_message_id);
        }
    }

    fn persist(&self, queue: &mpsc::UnboundedSender<NewMessage>, message: NewMessage) {
        let message_id = message.message_id.clone();
        let role = message.role;
        if queue.send(message).is_err() {
            logging::log_persist_error(
                &self.chat_id,
                &message_id,
                role.as_str(),
                "persistence worker stopped",
            );
        }
    }

    /// Consume the stream until it finishes, then wait for pending writes.
    ///
    /// The stream is drained even after the client disconnects or a terminal
    /// event arrives, so the producer is never left blocked.
    pub async fn run(self, mut stream: AnswerStream, mut sink: FrameSink) -> BridgeOutcome {
        let (queue, worker) = spawn_persist_worker(self.store.clone());
        let mut text = String::new();
        let mut outcome: Option<BridgeOutcome> = None;

        while let Some(event) = stream.recv().await {
            if outcome.is_some() {
                logging::log_event_after_termination(
                    &self.chat_id,
                    &self.assistant_message_id,
                    event.kind(),
                );
                continue;
            }

            match event {
                AnswerEvent::Response(fragment) => {
                    text.push_str(&fragment);
                    self.relay(
                        &mut sink,
                        StreamFrame::message(fragment, &self.assistant_message_id),
                    );
                }
                AnswerEvent::Sources(citations) => {
                    self.relay(
                        &mut sink,
                        StreamFrame::sources(citations.clone(), &self.assistant_message_id),
                    );
                    self.persist(
                        &queue,
                        NewMessage::source(&self.chat_id, generate_message_id(), citations),
                    );
                }
                AnswerEvent::End => {
                    self.relay(&mut sink, StreamFrame::message_end());
                    sink.close();
                    self.persist(
                        &queue,
                        NewMessage::assistant(&self.chat_id, &self.assistant_message_id, text.clone()),
                    );
                    outcome = Some(BridgeOutcome::Completed {
                        content: std::mem::take(&mut text),
                    });
                }
                AnswerEvent::Error(error) => {
                    self.relay(&mut sink, StreamFrame::error(error.clone()));
                    sink.close();
                    text.clear();
                    outcome = Some(BridgeOutcome::Failed { error });
                }
            }
        }

        let outcome = match outcome {
            Some(outcome) => outcome,
            None => {
                logging::log_stream_incomplete(&self.chat_id, &self.assistant_message_id);
                self.relay(&mut sink, StreamFrame::error(STREAM_ENDED_UNEXPECTEDLY));
                sink.close();
                BridgeOutcome::Interrupted
            }
        };

        drop(queue);
        if let Err(e) = worker.await {
            tracing::error!(chat_id = %self.chat_id, "Persistence worker panicked: {}", e);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::MessageRole;
    use crate::infrastructure::store::testing::FailingChatStore;
    use crate::infrastructure::MemoryChatStore;
    use serde_json::{json, Value};

    async fn collect_frames(mut rx: mpsc::UnboundedReceiver<FrameChunk>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Some(chunk) = rx.recv().await {
            let line = chunk.unwrap();
            assert!(line.ends_with('\n'));
            frames.push(serde_json::from_str(line.trim_end()).unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn test_relays_fragments_and_persists_answer() {
        let store = Arc::new(MemoryChatStore::new());
        let bridge = StreamBridge::with_message_id(store.clone(), "c1", "a1");
        let stream = AnswerStream::from_events(vec![
            AnswerEvent::Response("Hel".into()),
            AnswerEvent::Response("lo".into()),
            AnswerEvent::End,
        ]);
        let (sink, rx) = FrameSink::channel();

        let outcome = bridge.run(stream, sink).await;

        assert_eq!(outcome, BridgeOutcome::Completed { content: "Hello".into() });
        assert_eq!(
            collect_frames(rx).await,
            vec![
                json!({"type": "message", "data": "Hel", "messageId": "a1"}),
                json!({"type": "message", "data": "lo", "messageId": "a1"}),
                json!({"type": "messageEnd"}),
            ]
        );

        let messages = store.list_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert_eq!(messages[0].message_id, "a1");
        assert_eq!(messages[0].content.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_sources_persisted_before_answer() {
        let store = Arc::new(MemoryChatStore::new());
        let bridge = StreamBridge::with_message_id(store.clone(), "c1", "a1");
        let citation = json!({"title": "Rust", "url": "https://www.rust-lang.org"});
        let stream = AnswerStream::from_events(vec![
            AnswerEvent::Sources(vec![citation.clone()]),
            AnswerEvent::Response("Rust is a language.".into()),
            AnswerEvent::End,
        ]);
        let (sink, rx) = FrameSink::channel();

        bridge.run(stream, sink).await;

        let frames = collect_frames(rx).await;
        assert_eq!(
            frames[0],
            json!({"type": "sources", "data": [citation.clone()], "messageId": "a1"})
        );

        let messages = store.list_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::Source);
        assert_eq!(messages[0].sources, Some(vec![citation]));
        assert!(messages[0].content.is_none());
        assert_ne!(messages[0].message_id, "a1");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert!(messages[0].id < messages[1].id);
    }

    #[tokio::test]
    async fn test_error_discards_partial_answer() {
        let store = Arc::new(MemoryChatStore::new());
        let bridge = StreamBridge::with_message_id(store.clone(), "c1", "a1");
        let stream = AnswerStream::from_events(vec![
            AnswerEvent::Response("partial".into()),
            AnswerEvent::Error("upstream timeout".into()),
        ]);
        let (sink, rx) = FrameSink::channel();

        let outcome = bridge.run(stream, sink).await;

        assert_eq!(outcome, BridgeOutcome::Failed { error: "upstream timeout".into() });
        let frames = collect_frames(rx).await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], json!({"type": "error", "data": "upstream timeout"}));
        assert_eq!(store.message_count().await, 0);
    }

    #[tokio::test]
    async fn test_events_after_termination_are_ignored() {
        let store = Arc::new(MemoryChatStore::new());
        let bridge = StreamBridge::with_message_id(store.clone(), "c1", "a1");
        let stream = AnswerStream::from_events(vec![
            AnswerEvent::Response("done".into()),
            AnswerEvent::End,
            AnswerEvent::Response("late".into()),
            AnswerEvent::Sources(vec![json!({"url": "late"})]),
            AnswerEvent::Error("late".into()),
        ]);
        let (sink, rx) = FrameSink::channel();

        let outcome = bridge.run(stream, sink).await;

        assert_eq!(outcome, BridgeOutcome::Completed { content: "done".into() });
        let frames = collect_frames(rx).await;
        assert_eq!(frames.last().unwrap(), &json!({"type": "messageEnd"}));
        assert_eq!(frames.len(), 2);
        assert_eq!(store.message_count().await, 1);
    }

    #[tokio::test]
    async fn test_stream_without_terminal_event() {
        let store = Arc::new(MemoryChatStore::new());
        let bridge = StreamBridge::with_message_id(store.clone(), "c1", "a1");
        let stream = AnswerStream::from_events(vec![AnswerEvent::Response("cut".into())]);
        let (sink, rx) = FrameSink::channel();

        let outcome = bridge.run(stream, sink).await;

        assert_eq!(outcome, BridgeOutcome::Interrupted);
        let frames = collect_frames(rx).await;
        assert_eq!(
            frames.last().unwrap(),
            &json!({"type": "error", "data": STREAM_ENDED_UNEXPECTEDLY})
        );
        assert_eq!(store.message_count().await, 0);
    }

    #[tokio::test]
    async fn test_client_disconnect_still_persists() {
        let store = Arc::new(MemoryChatStore::new());
        let bridge = StreamBridge::with_message_id(store.clone(), "c1", "a1");
        let stream = AnswerStream::from_events(vec![
            AnswerEvent::Sources(vec![json!({"url": "u"})]),
            AnswerEvent::Response("still saved".into()),
            AnswerEvent::End,
        ]);
        let (sink, rx) = FrameSink::channel();
        drop(rx);

        let outcome = bridge.run(stream, sink).await;

        assert_eq!(outcome, BridgeOutcome::Completed { content: "still saved".into() });
        let messages = store.list_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content.as_deref(), Some("still saved"));
    }

    #[tokio::test]
    async fn test_persistence_failure_does_not_touch_stream() {
        let bridge = StreamBridge::with_message_id(Arc::new(FailingChatStore), "c1", "a1");
        let stream = AnswerStream::from_events(vec![
            AnswerEvent::Sources(vec![json!({"url": "u"})]),
            AnswerEvent::Response("ok".into()),
            AnswerEvent::End,
        ]);
        let (sink, rx) = FrameSink::channel();

        let outcome = bridge.run(stream, sink).await;

        assert_eq!(outcome, BridgeOutcome::Completed { content: "ok".into() });
        let frames = collect_frames(rx).await;
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2], json!({"type": "messageEnd"}));
    }

    #[test]
    fn test_closed_sink_ignores_writes() {
        let (mut sink, mut rx) = FrameSink::channel();
        assert!(sink.send(&StreamFrame::message("a", "m")));
        sink.close();

        assert!(!sink.is_open());
        assert!(!sink.send(&StreamFrame::message("b", "m")));
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_generated_assistant_ids_are_distinct() {
        let store: Arc<dyn ChatStore> = Arc::new(MemoryChatStore::new());
        let a = StreamBridge::new(store.clone(), "c1");
        let b = StreamBridge::new(store, "c1");
        assert_ne!(a.assistant_message_id(), b.assistant_message_id());
    }
}
