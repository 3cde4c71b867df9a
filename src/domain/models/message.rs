use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Citation record attached to an answer (opaque JSON, relayed verbatim)
pub type Citation = serde_json::Value;

/// Length of generated external message ids (hex characters)
pub const MESSAGE_ID_LEN: usize = 14;

/// Generate a random external message id of [`MESSAGE_ID_LEN`] hex characters.
///
/// Takes the tail of a v4 UUID, past the version and variant nibbles, so every
/// character carries random bits.
pub fn generate_message_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[hex.len() - MESSAGE_ID_LEN..].to_string()
}

/// Author of a persisted message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    Source,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Source => "source",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            "source" => Ok(MessageRole::Source),
            _ => Err(format!("Unknown message role: {}", s)),
        }
    }
}

/// Persisted message. `id` is the storage-assigned sequence number and defines
/// chronological order within a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub message_id: String,
    pub chat_id: String,
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Citation>>,
    pub created_at: String,
}

/// Message waiting for its sequence number
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub message_id: String,
    pub chat_id: String,
    pub role: MessageRole,
    pub content: Option<String>,
    pub sources: Option<Vec<Citation>>,
    pub created_at: String,
}

impl NewMessage {
    fn new(chat_id: impl Into<String>, message_id: impl Into<String>, role: MessageRole) -> Self {
        Self {
            message_id: message_id.into(),
            chat_id: chat_id.into(),
            role,
            content: None,
            sources: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn user(
        chat_id: impl Into<String>,
        message_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::new(chat_id, message_id, MessageRole::User)
        }
    }

    pub fn assistant(
        chat_id: impl Into<String>,
        message_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::new(chat_id, message_id, MessageRole::Assistant)
        }
    }

    /// Source messages carry citations and no text
    pub fn source(
        chat_id: impl Into<String>,
        message_id: impl Into<String>,
        sources: Vec<Citation>,
    ) -> Self {
        Self {
            sources: Some(sources),
            ..Self::new(chat_id, message_id, MessageRole::Source)
        }
    }

    pub fn into_message(self, id: i64) -> Message {
        Message {
            id,
            message_id: self.message_id,
            chat_id: self.chat_id,
            role: self.role,
            content: self.content,
            sources: self.sources,
            created_at: self.created_at,
        }
    }
}
