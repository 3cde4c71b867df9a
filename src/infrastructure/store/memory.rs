//! In-memory chat store, used by tests and the `memory` storage backend

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ChatStore, StoreError};
use crate::domain::models::{Chat, FileDescriptor, Message, NewMessage};

#[derive(Default)]
struct MemoryState {
    chats: Vec<Chat>,
    messages: Vec<Message>,
    last_sequence: i64,
}

/// Chat store kept in process memory
#[derive(Default)]
pub struct MemoryChatStore {
    state: RwLock<MemoryState>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages across all chats
    pub async fn message_count(&self) -> usize {
        self.state.read().await.messages.len()
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn find_chat(&self, chat_id: &str) -> Result<Option<Chat>, StoreError> {
        let state = self.state.read().await;
        Ok(state.chats.iter().find(|c| c.id == chat_id).cloned())
    }

    async fn insert_chat(&self, chat: Chat) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.chats.iter().any(|c| c.id == chat.id) {
            return Err(StoreError::Database(format!("Chat already exists: {}", chat.id)));
        }
        state.chats.push(chat);
        Ok(())
    }

    async fn update_chat_files(
        &self,
        chat_id: &str,
        files: Vec<FileDescriptor>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(chat) = state.chats.iter_mut().find(|c| c.id == chat_id) {
            chat.files = files;
        }
        Ok(())
    }

    async fn list_chats(&self) -> Result<Vec<Chat>, StoreError> {
        Ok(self.state.read().await.chats.clone())
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.chats.len();
        state.chats.retain(|c| c.id != chat_id);
        let existed = state.chats.len() != before;
        state.messages.retain(|m| m.chat_id != chat_id);
        Ok(existed)
    }

    async fn find_message(
        &self,
        chat_id: &str,
        message_id: &str,
    ) -> Result<Option<Message>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .find(|m| m.chat_id == chat_id && m.message_id == message_id)
            .cloned())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut state = self.state.write().await;
        state.last_sequence += 1;
        let message = message.into_message(state.last_sequence);
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn delete_messages_after(&self, chat_id: &str, after: i64) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        let before = state.messages.len();
        state
            .messages
            .retain(|m| !(m.chat_id == chat_id && m.id > after));
        Ok(before - state.messages.len())
    }

    async fn list_messages(&self, chat_id: &str) -> Result<Vec<Message>, StoreError> {
        let state = self.state.read().await;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }
}
