//! Storage interface consumed by the turn pipeline

mod memory;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::{Chat, FileDescriptor, Message, NewMessage};

pub use memory::MemoryChatStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
}

impl From<surrealdb::Error> for StoreError {
    fn from(e: surrealdb::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Insert/update/delete/query over chats and their messages.
///
/// Implementations assign `Message::id` from a sequence that only grows, so
/// ordering by id is chronological.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn find_chat(&self, chat_id: &str) -> Result<Option<Chat>, StoreError>;

    async fn insert_chat(&self, chat: Chat) -> Result<(), StoreError>;

    /// Replace the file set of a chat; other fields are untouched
    async fn update_chat_files(
        &self,
        chat_id: &str,
        files: Vec<FileDescriptor>,
    ) -> Result<(), StoreError>;

    /// All chats in creation order
    async fn list_chats(&self) -> Result<Vec<Chat>, StoreError>;

    /// Delete a chat and all its messages; false if it did not exist
    async fn delete_chat(&self, chat_id: &str) -> Result<bool, StoreError>;

    async fn find_message(
        &self,
        chat_id: &str,
        message_id: &str,
    ) -> Result<Option<Message>, StoreError>;

    /// Persist a message, assigning the next sequence number
    async fn insert_message(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// Delete every message of the chat with a sequence number strictly
    /// greater than `after`; returns how many were removed
    async fn delete_messages_after(&self, chat_id: &str, after: i64) -> Result<usize, StoreError>;

    /// Messages of a chat in sequence order
    async fn list_messages(&self, chat_id: &str) -> Result<Vec<Message>, StoreError>;
}
