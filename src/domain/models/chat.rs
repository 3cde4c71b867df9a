use chrono::Utc;
use serde::{Deserialize, Serialize};

/// File attached to a chat, derived from an uploaded file reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    pub file_id: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_id: file_id.into(),
        }
    }
}

/// Structural comparison of two file sets (serialized form, order-sensitive)
pub fn same_file_set(left: &[FileDescriptor], right: &[FileDescriptor]) -> bool {
    match (serde_json::to_string(left), serde_json::to_string(right)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

/// Persisted conversation header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub focus_mode: String,
    #[serde(default)]
    pub files: Vec<FileDescriptor>,
}

impl Chat {
    /// New chat stamped with the current time
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        focus_mode: impl Into<String>,
        files: Vec<FileDescriptor>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: Utc::now().to_rfc3339(),
            focus_mode: focus_mode.into(),
            files,
        }
    }
}
