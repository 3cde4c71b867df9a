//! Message repository for database operations

use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use crate::domain::models::{Citation, Message, MessageRole, NewMessage};
use crate::infrastructure::store::StoreError;

/// Message record in database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub seq: i64,
    pub message_id: String,
    pub chat_id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Citation>>,
    pub created_at: String,
}

impl MessageRecord {
    pub fn from_new(message: NewMessage, seq: i64) -> Self {
        Self {
            seq,
            message_id: message.message_id,
            chat_id: message.chat_id,
            role: message.role.as_str().to_string(),
            content: message.content,
            sources: message.sources,
            created_at: message.created_at,
        }
    }

    pub fn into_message(self) -> Result<Message, StoreError> {
        let role: MessageRole = self.role.parse().map_err(|e: String| {
            StoreError::CorruptRecord(format!("message {}: {}", self.message_id, e))
        })?;

        Ok(Message {
            id: self.seq,
            message_id: self.message_id,
            chat_id: self.chat_id,
            role,
            content: self.content,
            sources: self.sources,
            created_at: self.created_at,
        })
    }
}

/// Message repository
pub struct MessageRepository;

impl MessageRepository {
    /// Allocate the next global message sequence number
    pub async fn next_sequence(db: &Surreal<Db>) -> Result<i64, StoreError> {
        let seq: Option<i64> = db
            .query("UPSERT ONLY counter:message SET current += 1 RETURN VALUE current")
            .await
            .map_err(|e| StoreError::Database(format!("Failed to advance sequence: {}", e)))?
            .take(0)
            .map_err(|e| StoreError::Database(format!("Failed to get sequence: {}", e)))?;

        seq.ok_or_else(|| StoreError::Database("Sequence counter returned nothing".to_string()))
    }

    /// Insert a message record
    pub async fn create(db: &Surreal<Db>, record: MessageRecord) -> Result<(), StoreError> {
        let seq = record.seq;
        let created: Option<MessageRecord> = db
            .create("message")
            .content(record)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to create message: {}", e)))?;

        created
            .map(|_| ())
            .ok_or_else(|| StoreError::Database(format!("Failed to create message #{}", seq)))
    }

    /// Find the earliest message in a chat with the given message id
    pub async fn find_by_message_id(
        db: &Surreal<Db>,
        chat_id: &str,
        message_id: &str,
    ) -> Result<Option<MessageRecord>, StoreError> {
        let result: Option<MessageRecord> = db
            .query(r#"
                SELECT * FROM message
                WHERE chat_id = $chat_id AND message_id = $message_id
                ORDER BY seq ASC
                LIMIT 1
            "#)
            .bind(("chat_id", chat_id.to_string()))
            .bind(("message_id", message_id.to_string()))
            .await
            .map_err(|e| StoreError::Database(format!("Failed to find message: {}", e)))?
            .take(0)
            .map_err(|e| StoreError::Database(format!("Failed to get message: {}", e)))?;

        Ok(result)
    }

    /// Get all messages for a chat in sequence order
    pub async fn find_by_chat(
        db: &Surreal<Db>,
        chat_id: &str,
    ) -> Result<Vec<MessageRecord>, StoreError> {
        let result: Vec<MessageRecord> = db
            .query("SELECT * FROM message WHERE chat_id = $chat_id ORDER BY seq ASC")
            .bind(("chat_id", chat_id.to_string()))
            .await
            .map_err(|e| StoreError::Database(format!("Failed to get messages: {}", e)))?
            .take(0)
            .map_err(|e| StoreError::Database(format!("Failed to parse messages: {}", e)))?;

        Ok(result)
    }

    /// Delete every message of a chat with a sequence number above `after`
    pub async fn delete_after(
        db: &Surreal<Db>,
        chat_id: &str,
        after: i64,
    ) -> Result<usize, StoreError> {
        let removed: Vec<MessageRecord> = db
            .query("DELETE message WHERE chat_id = $chat_id AND seq > $after RETURN BEFORE")
            .bind(("chat_id", chat_id.to_string()))
            .bind(("after", after))
            .await
            .map_err(|e| StoreError::Database(format!("Failed to delete messages: {}", e)))?
            .take(0)
            .map_err(|e| StoreError::Database(format!("Failed to get deleted messages: {}", e)))?;

        Ok(removed.len())
    }

    /// Delete all messages for a chat
    pub async fn delete_by_chat(db: &Surreal<Db>, chat_id: &str) -> Result<(), StoreError> {
        db.query("DELETE message WHERE chat_id = $chat_id")
            .bind(("chat_id", chat_id.to_string()))
            .await
            .map_err(|e| StoreError::Database(format!("Failed to delete messages: {}", e)))?;

        Ok(())
    }
}
