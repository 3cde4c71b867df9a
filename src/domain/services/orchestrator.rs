//! Runs one turn in the background: reconcile history, then relay the answer

use tokio::task::JoinHandle;

use crate::answer::AnswerStream;
use crate::domain::models::Turn;
use crate::domain::services::{
    BridgeOutcome, FrameSink, HistoryReconciler, ReconcileOutcome, StreamBridge,
};
use crate::shared::logging;

/// Everything a detached turn needs once the response has been handed back
pub struct TurnTask {
    pub turn: Turn,
    pub focus_mode: String,
    pub file_ids: Vec<String>,
    pub bridge: StreamBridge,
    pub stream: AnswerStream,
    pub sink: FrameSink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// `None` when reconciliation failed (the failure is logged)
    pub reconcile: Option<ReconcileOutcome>,
    pub bridge: BridgeOutcome,
}

/// Spawn the turn; the caller does not need to await the handle
pub fn spawn_turn(reconciler: HistoryReconciler, task: TurnTask) -> JoinHandle<TurnReport> {
    tokio::spawn(run_turn(reconciler, task))
}

/// Reconciliation finishes before the first relayed event, so deletions for a
/// resubmitted turn can never hit messages this turn persists.
pub async fn run_turn(reconciler: HistoryReconciler, task: TurnTask) -> TurnReport {
    let TurnTask {
        turn,
        focus_mode,
        file_ids,
        bridge,
        stream,
        sink,
    } = task;

    let reconcile = match reconciler.reconcile(&turn, &focus_mode, &file_ids).await {
        Ok(outcome) => {
            logging::log_reconcile_result(
                &turn.chat_id,
                &turn.message_id,
                outcome.created_chat,
                outcome.resubmission,
                outcome.removed_messages,
            );
            Some(outcome)
        }
        Err(e) => {
            logging::log_reconcile_error(&turn.chat_id, &turn.message_id, &e.to_string());
            None
        }
    };

    let assistant_message_id = bridge.assistant_message_id().to_string();
    let outcome = bridge.run(stream, sink).await;

    let answer_len = match &outcome {
        BridgeOutcome::Completed { content } => content.len(),
        _ => 0,
    };
    logging::log_turn_finished(
        &turn.chat_id,
        &assistant_message_id,
        outcome.as_str(),
        answer_len,
    );

    TurnReport {
        reconcile,
        bridge: outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::answer::AnswerEvent;
    use crate::domain::models::{FileDescriptor, MessageRole};
    use crate::domain::services::FileDescriber;
    use crate::infrastructure::store::testing::FailingChatStore;
    use crate::infrastructure::{ChatStore, MemoryChatStore};
    use serde_json::Value;

    struct NoFiles;

    #[async_trait::async_trait]
    impl FileDescriber for NoFiles {
        async fn describe(&self, file_id: &str) -> FileDescriptor {
            FileDescriptor::new(file_id, file_id)
        }
    }

    fn task(
        store: Arc<dyn ChatStore>,
        message_id: &str,
        content: &str,
        events: Vec<AnswerEvent>,
    ) -> (TurnTask, tokio::sync::mpsc::UnboundedReceiver<crate::domain::services::FrameChunk>) {
        let (sink, rx) = FrameSink::channel();
        let task = TurnTask {
            turn: Turn {
                message_id: message_id.to_string(),
                chat_id: "c1".to_string(),
                content: content.to_string(),
            },
            focus_mode: "web".to_string(),
            file_ids: vec![],
            bridge: StreamBridge::new(store, "c1"),
            stream: AnswerStream::from_events(events),
            sink,
        };
        (task, rx)
    }

    async fn frames(
        mut rx: tokio::sync::mpsc::UnboundedReceiver<crate::domain::services::FrameChunk>,
    ) -> Vec<Value> {
        let mut out = Vec::new();
        while let Some(chunk) = rx.recv().await {
            out.push(serde_json::from_str(chunk.unwrap().trim_end()).unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_first_turn_end_to_end() {
        let store = Arc::new(MemoryChatStore::new());
        let reconciler = HistoryReconciler::new(store.clone(), Arc::new(NoFiles));
        let (task, rx) = task(
            store.clone(),
            "m1",
            "hello",
            vec![
                AnswerEvent::Response("Hi".into()),
                AnswerEvent::Response(", how can I help?".into()),
                AnswerEvent::End,
            ],
        );

        let report = spawn_turn(reconciler, task).await.unwrap();

        assert!(report.reconcile.unwrap().created_chat);
        let frames = frames(rx).await;
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2]["type"], "messageEnd");

        let streamed: String = frames
            .iter()
            .filter(|f| f["type"] == "message")
            .map(|f| f["data"].as_str().unwrap())
            .collect();

        let chat = store.find_chat("c1").await.unwrap().unwrap();
        assert_eq!(chat.title, "hello");

        let messages = store.list_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content.as_deref(), Some(streamed.as_str()));
        assert_eq!(frames[0]["messageId"], messages[1].message_id.as_str());
    }

    #[tokio::test]
    async fn test_resubmitted_turn_replaces_old_answer() {
        let store = Arc::new(MemoryChatStore::new());
        let reconciler = HistoryReconciler::new(store.clone(), Arc::new(NoFiles));

        let (first, _rx) = task(
            store.clone(),
            "m1",
            "hello",
            vec![
                AnswerEvent::Sources(vec![serde_json::json!({"url": "a"})]),
                AnswerEvent::Response("old answer".into()),
                AnswerEvent::End,
            ],
        );
        spawn_turn(reconciler.clone(), first).await.unwrap();
        assert_eq!(store.message_count().await, 3);

        let (second, rx) = task(
            store.clone(),
            "m1",
            "hello again",
            vec![AnswerEvent::Response("new answer".into()), AnswerEvent::End],
        );
        let report = spawn_turn(reconciler, second).await.unwrap();

        let reconcile = report.reconcile.unwrap();
        assert!(reconcile.resubmission);
        assert_eq!(reconcile.removed_messages, 2);
        assert_eq!(frames(rx).await.len(), 2);

        let messages = store.list_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content.as_deref(), Some("hello"));
        assert_eq!(messages[1].content.as_deref(), Some("new answer"));
    }

    #[tokio::test]
    async fn test_reconcile_failure_does_not_stop_stream() {
        let store: Arc<dyn ChatStore> = Arc::new(FailingChatStore);
        let reconciler = HistoryReconciler::new(store.clone(), Arc::new(NoFiles));
        let (task, rx) = task(
            store,
            "m1",
            "hello",
            vec![AnswerEvent::Response("still here".into()), AnswerEvent::End],
        );

        let report = run_turn(reconciler, task).await;

        assert!(report.reconcile.is_none());
        assert_eq!(report.bridge, BridgeOutcome::Completed { content: "still here".into() });
        assert_eq!(frames(rx).await.len(), 2);
    }
}
