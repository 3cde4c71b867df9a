use serde::{Deserialize, Serialize};

use super::message::Citation;

/// One framed record of the client-facing NDJSON stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamFrame {
    /// Text fragment of the assistant answer
    Message {
        data: String,
        #[serde(rename = "messageId")]
        message_id: String,
    },
    /// Citations backing the answer
    Sources {
        data: Vec<Citation>,
        #[serde(rename = "messageId")]
        message_id: String,
    },
    /// Answer completed
    MessageEnd,
    /// Answer failed
    Error { data: String },
}

impl StreamFrame {
    pub fn message(data: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self::Message {
            data: data.into(),
            message_id: message_id.into(),
        }
    }

    pub fn sources(data: Vec<Citation>, message_id: impl Into<String>) -> Self {
        Self::Sources {
            data,
            message_id: message_id.into(),
        }
    }

    pub fn message_end() -> Self {
        Self::MessageEnd
    }

    pub fn error(data: impl Into<String>) -> Self {
        Self::Error { data: data.into() }
    }

    /// Convert to NDJSON line (without the trailing newline)
    pub fn to_ndjson(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
