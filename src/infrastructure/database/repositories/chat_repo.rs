//! Chat repository for database operations

use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use crate::domain::models::{Chat, FileDescriptor};
use crate::infrastructure::store::StoreError;

/// Chat record in database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub chat_id: String,
    pub title: String,
    pub created_at: String,
    pub focus_mode: String,
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

impl From<Chat> for ChatRecord {
    fn from(chat: Chat) -> Self {
        Self {
            chat_id: chat.id,
            title: chat.title,
            created_at: chat.created_at,
            focus_mode: chat.focus_mode,
            files: chat.files,
        }
    }
}

impl From<ChatRecord> for Chat {
    fn from(record: ChatRecord) -> Self {
        Self {
            id: record.chat_id,
            title: record.title,
            created_at: record.created_at,
            focus_mode: record.focus_mode,
            files: record.files,
        }
    }
}

/// Chat repository
pub struct ChatRepository;

impl ChatRepository {
    /// Insert a new chat
    pub async fn create(db: &Surreal<Db>, record: ChatRecord) -> Result<(), StoreError> {
        let chat_id = record.chat_id.clone();
        let created: Option<ChatRecord> = db
            .create("chat")
            .content(record)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to create chat: {}", e)))?;

        created
            .map(|_| ())
            .ok_or_else(|| StoreError::Database(format!("Failed to create chat {}", chat_id)))
    }

    /// Find chat by its public id
    pub async fn find_by_chat_id(
        db: &Surreal<Db>,
        chat_id: &str,
    ) -> Result<Option<ChatRecord>, StoreError> {
        let result: Option<ChatRecord> = db
            .query("SELECT * FROM chat WHERE chat_id = $chat_id LIMIT 1")
            .bind(("chat_id", chat_id.to_string()))
            .await
            .map_err(|e| StoreError::Database(format!("Failed to find chat: {}", e)))?
            .take(0)
            .map_err(|e| StoreError::Database(format!("Failed to get chat: {}", e)))?;

        Ok(result)
    }

    /// Replace the attached file list
    pub async fn update_files(
        db: &Surreal<Db>,
        chat_id: &str,
        files: Vec<FileDescriptor>,
    ) -> Result<(), StoreError> {
        db.query("UPDATE chat SET files = $files WHERE chat_id = $chat_id")
            .bind(("files", files))
            .bind(("chat_id", chat_id.to_string()))
            .await
            .map_err(|e| StoreError::Database(format!("Failed to update chat files: {}", e)))?;

        Ok(())
    }

    /// Get all chats in creation order
    pub async fn find_all(db: &Surreal<Db>) -> Result<Vec<ChatRecord>, StoreError> {
        let result: Vec<ChatRecord> = db
            .query("SELECT * FROM chat ORDER BY created_at ASC")
            .await
            .map_err(|e| StoreError::Database(format!("Failed to list chats: {}", e)))?
            .take(0)
            .map_err(|e| StoreError::Database(format!("Failed to get chats: {}", e)))?;

        Ok(result)
    }

    /// Delete a chat, returning whether it existed
    pub async fn delete(db: &Surreal<Db>, chat_id: &str) -> Result<bool, StoreError> {
        let removed: Vec<ChatRecord> = db
            .query("DELETE chat WHERE chat_id = $chat_id RETURN BEFORE")
            .bind(("chat_id", chat_id.to_string()))
            .await
            .map_err(|e| StoreError::Database(format!("Failed to delete chat: {}", e)))?
            .take(0)
            .map_err(|e| StoreError::Database(format!("Failed to get deleted chat: {}", e)))?;

        Ok(!removed.is_empty())
    }
}
