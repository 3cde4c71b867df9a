//! Keeps the persisted chat and message list in step with incoming turns

use std::sync::Arc;

use crate::domain::models::{same_file_set, Chat, NewMessage, Turn};
use crate::domain::services::FileDescriber;
use crate::infrastructure::{ChatStore, StoreError};

/// What a reconciliation changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub created_chat: bool,
    pub files_updated: bool,
    /// The turn's message id was already stored
    pub resubmission: bool,
    /// Messages dropped because they followed a resubmitted turn
    pub removed_messages: usize,
}

#[derive(Clone)]
pub struct HistoryReconciler {
    store: Arc<dyn ChatStore>,
    files: Arc<dyn FileDescriber>,
}

impl HistoryReconciler {
    pub fn new(store: Arc<dyn ChatStore>, files: Arc<dyn FileDescriber>) -> Self {
        Self { store, files }
    }

    /// Record the user's side of a turn.
    ///
    /// A first turn creates the chat. A turn whose message id is already
    /// stored is an edit: everything after the original message is deleted
    /// and the original message is kept as it was.
    pub async fn reconcile(
        &self,
        turn: &Turn,
        focus_mode: &str,
        file_ids: &[String],
    ) -> Result<ReconcileOutcome, StoreError> {
        let files = self.files.describe_all(file_ids).await;
        let mut outcome = ReconcileOutcome::default();

        match self.store.find_chat(&turn.chat_id).await? {
            None => {
                let chat = Chat::new(&turn.chat_id, &turn.content, focus_mode, files);
                self.store.insert_chat(chat).await?;
                outcome.created_chat = true;
            }
            Some(chat) => {
                if !same_file_set(&chat.files, &files) {
                    self.store.update_chat_files(&turn.chat_id, files).await?;
                    outcome.files_updated = true;
                }
            }
        }

        match self
            .store
            .find_message(&turn.chat_id, &turn.message_id)
            .await?
        {
            None => {
                self.store
                    .insert_message(NewMessage::user(
                        &turn.chat_id,
                        &turn.message_id,
                        &turn.content,
                    ))
                    .await?;
            }
            Some(existing) => {
                outcome.resubmission = true;
                outcome.removed_messages = self
                    .store
                    .delete_messages_after(&turn.chat_id, existing.id)
                    .await?;
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{FileDescriptor, MessageRole};
    use crate::infrastructure::store::testing::FailingChatStore;
    use crate::infrastructure::MemoryChatStore;

    struct IdDescriber;

    #[async_trait::async_trait]
    impl FileDescriber for IdDescriber {
        async fn describe(&self, file_id: &str) -> FileDescriptor {
            FileDescriptor::new(format!("{}.pdf", file_id), file_id)
        }
    }

    fn turn(message_id: &str, content: &str) -> Turn {
        Turn {
            message_id: message_id.to_string(),
            chat_id: "c1".to_string(),
            content: content.to_string(),
        }
    }

    fn setup() -> (Arc<MemoryChatStore>, HistoryReconciler) {
        let store = Arc::new(MemoryChatStore::new());
        let reconciler = HistoryReconciler::new(store.clone(), Arc::new(IdDescriber));
        (store, reconciler)
    }

    #[tokio::test]
    async fn test_first_turn_creates_chat_and_user_message() {
        let (store, reconciler) = setup();

        let outcome = reconciler
            .reconcile(&turn("m1", "hello"), "webSearch", &["f1".to_string()])
            .await
            .unwrap();

        assert!(outcome.created_chat);
        assert!(!outcome.resubmission);

        let chat = store.find_chat("c1").await.unwrap().unwrap();
        assert_eq!(chat.title, "hello");
        assert_eq!(chat.focus_mode, "webSearch");
        assert_eq!(chat.files, vec![FileDescriptor::new("f1.pdf", "f1")]);

        let messages = store.list_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_second_turn_does_not_duplicate_chat() {
        let (store, reconciler) = setup();
        reconciler.reconcile(&turn("m1", "hello"), "webSearch", &[]).await.unwrap();

        let outcome = reconciler
            .reconcile(&turn("m2", "and then?"), "webSearch", &[])
            .await
            .unwrap();

        assert!(!outcome.created_chat);
        assert!(!outcome.files_updated);
        assert_eq!(store.list_chats().await.unwrap().len(), 1);
        assert_eq!(store.find_chat("c1").await.unwrap().unwrap().title, "hello");
        assert_eq!(store.list_messages("c1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_changed_files_update_chat() {
        let (store, reconciler) = setup();
        reconciler
            .reconcile(&turn("m1", "hello"), "webSearch", &["f1".to_string()])
            .await
            .unwrap();

        let outcome = reconciler
            .reconcile(
                &turn("m2", "more"),
                "webSearch",
                &["f1".to_string(), "f2".to_string()],
            )
            .await
            .unwrap();

        assert!(outcome.files_updated);
        let chat = store.find_chat("c1").await.unwrap().unwrap();
        assert_eq!(chat.files.len(), 2);
        assert_eq!(chat.title, "hello");
    }

    #[tokio::test]
    async fn test_resubmission_drops_later_messages() {
        let (store, reconciler) = setup();
        reconciler.reconcile(&turn("m1", "hello"), "webSearch", &[]).await.unwrap();
        store
            .insert_message(NewMessage::source("c1", "s1", vec![serde_json::json!({"url": "u"})]))
            .await
            .unwrap();
        store
            .insert_message(NewMessage::assistant("c1", "a1", "hi there"))
            .await
            .unwrap();

        let outcome = reconciler
            .reconcile(&turn("m1", "hello, edited"), "webSearch", &[])
            .await
            .unwrap();

        assert!(outcome.resubmission);
        assert_eq!(outcome.removed_messages, 2);

        let messages = store.list_messages("c1").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_id, "m1");
        assert_eq!(messages[0].content.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let reconciler = HistoryReconciler::new(Arc::new(FailingChatStore), Arc::new(IdDescriber));
        let result = reconciler.reconcile(&turn("m1", "hello"), "webSearch", &[]).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
