//! Store that rejects every call, for failure-path tests

use async_trait::async_trait;

use super::{ChatStore, StoreError};
use crate::domain::models::{Chat, FileDescriptor, Message, NewMessage};

pub struct FailingChatStore;

fn unavailable<T>() -> Result<T, StoreError> {
    Err(StoreError::Database("store unavailable".to_string()))
}

#[async_trait]
impl ChatStore for FailingChatStore {
    async fn find_chat(&self, _chat_id: &str) -> Result<Option<Chat>, StoreError> {
        unavailable()
    }

    async fn insert_chat(&self, _chat: Chat) -> Result<(), StoreError> {
        unavailable()
    }

    async fn update_chat_files(
        &self,
        _chat_id: &str,
        _files: Vec<FileDescriptor>,
    ) -> Result<(), StoreError> {
        unavailable()
    }

    async fn list_chats(&self) -> Result<Vec<Chat>, StoreError> {
        unavailable()
    }

    async fn delete_chat(&self, _chat_id: &str) -> Result<bool, StoreError> {
        unavailable()
    }

    async fn find_message(
        &self,
        _chat_id: &str,
        _message_id: &str,
    ) -> Result<Option<Message>, StoreError> {
        unavailable()
    }

    async fn insert_message(&self, _message: NewMessage) -> Result<Message, StoreError> {
        unavailable()
    }

    async fn delete_messages_after(&self, _chat_id: &str, _after: i64) -> Result<usize, StoreError> {
        unavailable()
    }

    async fn list_messages(&self, _chat_id: &str) -> Result<Vec<Message>, StoreError> {
        unavailable()
    }
}
