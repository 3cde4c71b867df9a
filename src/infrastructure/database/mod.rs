//! SurrealDB-backed chat history
//!
//! This module provides:
//! - Embedded SurrealDB connection (RocksDB on disk, or in-memory)
//! - Schema definitions for chats, messages and the message sequence counter
//! - Repository layer for CRUD operations
//! - [`SurrealChatStore`], the [`ChatStore`] implementation over the repositories

pub mod connection;
pub mod schema;
pub mod repositories;

use async_trait::async_trait;

use crate::domain::models::{Chat, FileDescriptor, Message, NewMessage};
use crate::infrastructure::store::{ChatStore, StoreError};

pub use connection::{connect, Database};
pub use schema::run_migrations;
pub use repositories::{ChatRecord, ChatRepository, MessageRecord, MessageRepository};

/// Chat store persisted in SurrealDB
#[derive(Clone)]
pub struct SurrealChatStore {
    db: Database,
}

impl SurrealChatStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChatStore for SurrealChatStore {
    async fn find_chat(&self, chat_id: &str) -> Result<Option<Chat>, StoreError> {
        Ok(ChatRepository::find_by_chat_id(&self.db, chat_id)
            .await?
            .map(Chat::from))
    }

    async fn insert_chat(&self, chat: Chat) -> Result<(), StoreError> {
        ChatRepository::create(&self.db, ChatRecord::from(chat)).await
    }

    async fn update_chat_files(
        &self,
        chat_id: &str,
        files: Vec<FileDescriptor>,
    ) -> Result<(), StoreError> {
        ChatRepository::update_files(&self.db, chat_id, files).await
    }

    async fn list_chats(&self) -> Result<Vec<Chat>, StoreError> {
        Ok(ChatRepository::find_all(&self.db)
            .await?
            .into_iter()
            .map(Chat::from)
            .collect())
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<bool, StoreError> {
        let existed = ChatRepository::delete(&self.db, chat_id).await?;
        MessageRepository::delete_by_chat(&self.db, chat_id).await?;
        Ok(existed)
    }

    async fn find_message(
        &self,
        chat_id: &str,
        message_id: &str,
    ) -> Result<Option<Message>, StoreError> {
        MessageRepository::find_by_message_id(&self.db, chat_id, message_id)
            .await?
            .map(MessageRecord::into_message)
            .transpose()
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let seq = MessageRepository::next_sequence(&self.db).await?;
        let record = MessageRecord::from_new(message, seq);
        MessageRepository::create(&self.db, record.clone()).await?;
        record.into_message()
    }

    async fn delete_messages_after(&self, chat_id: &str, after: i64) -> Result<usize, StoreError> {
        MessageRepository::delete_after(&self.db, chat_id, after).await
    }

    async fn list_messages(&self, chat_id: &str) -> Result<Vec<Message>, StoreError> {
        MessageRepository::find_by_chat(&self.db, chat_id)
            .await?
            .into_iter()
            .map(MessageRecord::into_message)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StorageBackend, StorageConfig};
    use crate::domain::models::MessageRole;
    use serde_json::json;

    async fn memory_store() -> SurrealChatStore {
        let config = StorageConfig {
            backend: StorageBackend::SurrealMemory,
            ..StorageConfig::default()
        };
        SurrealChatStore::new(connect(&config).await.unwrap())
    }

    #[tokio::test]
    async fn test_chat_history_round_trip() {
        let store = memory_store().await;

        store.insert_chat(Chat::new("c1", "hello", "webSearch", vec![])).await.unwrap();
        store
            .update_chat_files("c1", vec![FileDescriptor::new("report.pdf", "f1")])
            .await
            .unwrap();
        let chat = store.find_chat("c1").await.unwrap().unwrap();
        assert_eq!(chat.files, vec![FileDescriptor::new("report.pdf", "f1")]);

        let first = store.insert_message(NewMessage::user("c1", "m1", "hi")).await.unwrap();
        let source = store
            .insert_message(NewMessage::source("c1", "s1", vec![json!({"metadata": {"url": "https://example.com"}})]))
            .await
            .unwrap();
        let answer = store
            .insert_message(NewMessage::assistant("c1", "a1", "hello"))
            .await
            .unwrap();
        assert!(first.id < source.id && source.id < answer.id);

        let found = store.find_message("c1", "m1").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.role, MessageRole::User);

        let removed = store.delete_messages_after("c1", first.id).await.unwrap();
        assert_eq!(removed, 2);
        let remaining = store.list_messages("c1").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message_id, "m1");

        assert!(store.delete_chat("c1").await.unwrap());
        assert!(!store.delete_chat("c1").await.unwrap());
        assert!(store.list_chats().await.unwrap().is_empty());
        assert!(store.list_messages("c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_chat_rejected() {
        let store = memory_store().await;
        store.insert_chat(Chat::new("c1", "t", "webSearch", vec![])).await.unwrap();
        assert!(store.insert_chat(Chat::new("c1", "t", "webSearch", vec![])).await.is_err());
    }
}
