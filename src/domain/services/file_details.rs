//! Derives chat file descriptors from uploaded file ids

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::models::FileDescriptor;

/// Maps a file reference to the descriptor stored on the chat
#[async_trait]
pub trait FileDescriber: Send + Sync {
    async fn describe(&self, file_id: &str) -> FileDescriptor;

    /// Descriptors in the order of `file_ids`
    async fn describe_all(&self, file_ids: &[String]) -> Vec<FileDescriptor> {
        let mut files = Vec::with_capacity(file_ids.len());
        for id in file_ids {
            files.push(self.describe(id).await);
        }
        files
    }
}

#[derive(Deserialize)]
struct ExtractedFile {
    title: String,
}

/// Reads titles from `<dir>/<fileId>-extracted.json`, as written by the upload pipeline
#[derive(Debug, Clone)]
pub struct UploadsFileDescriber {
    dir: PathBuf,
}

impl UploadsFileDescriber {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn read_title(&self, file_id: &str) -> Result<String, String> {
        let path = self.dir.join(format!("{}-extracted.json", file_id));
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let extracted: ExtractedFile = serde_json::from_str(&raw)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        Ok(extracted.title)
    }
}

#[async_trait]
impl FileDescriber for UploadsFileDescriber {
    async fn describe(&self, file_id: &str) -> FileDescriptor {
        // Ids never contain separators; anything else is not an upload of ours
        if file_id.contains(['/', '\\']) || file_id.contains("..") {
            tracing::warn!(file_id = file_id, "Rejected suspicious file id");
            return FileDescriptor::new(file_id, file_id);
        }

        match self.read_title(file_id).await {
            Ok(title) => FileDescriptor::new(title, file_id),
            Err(e) => {
                tracing::warn!(file_id = file_id, error = %e, "No extracted metadata for file");
                FileDescriptor::new(file_id, file_id)
            }
        }
    }
}
