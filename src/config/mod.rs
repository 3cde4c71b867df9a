//! Application configuration
//!
//! Loaded from a TOML file; every field has a default, so an absent file or a
//! partial one is fine.

pub mod loader;

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::{ChatModel, CustomOpenAiCredentials, EmbeddingModel, ModelCatalog};
use crate::domain::services::ModelResolver;

pub use loader::{load, load_from_path};

/// Instructions used when a turn does not bring its own
pub const DEFAULT_SYSTEM_INSTRUCTIONS: &str = "Be helpful, accurate and concise. \
Cite sources when they are available and say so when you are unsure.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub uploads: UploadsConfig,
    pub chat: ChatConfig,
    /// Credentials for the `custom_openai` provider
    pub custom_openai: Option<CustomOpenAiCredentials>,
    /// Model providers, in fallback order
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

/// Where chat history lives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// SurrealDB on RocksDB
    #[default]
    Surreal,
    /// SurrealDB without a disk
    SurrealMemory,
    /// Plain in-process store
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database directory; defaults to `~/.chat-stream-hub/surreal`
    pub path: Option<PathBuf>,
    pub namespace: String,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: None,
            namespace: "chat_stream_hub".to_string(),
            database: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    pub dir: PathBuf,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub system_instructions: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_instructions: DEFAULT_SYSTEM_INSTRUCTIONS.to_string(),
        }
    }
}

/// One OpenAI-compatible backend and the models it serves
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub key: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub chat_models: Vec<String>,
    pub embedding_models: Vec<String>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".into()));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if provider.key.trim().is_empty() {
                return Err(ConfigError::Invalid("provider key must not be empty".into()));
            }
            if !seen.insert(provider.key.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate provider key: {}",
                    provider.key
                )));
            }
        }

        Ok(())
    }

    /// Build the model catalogs in provider order
    pub fn model_resolver(&self) -> ModelResolver {
        let mut chat = ModelCatalog::new();
        let mut embedding = ModelCatalog::new();

        for provider in &self.providers {
            let base_url = Some(provider.base_url.clone()).filter(|url| !url.is_empty());

            for name in &provider.chat_models {
                chat.insert(
                    &provider.key,
                    name,
                    ChatModel {
                        provider: provider.key.clone(),
                        name: name.clone(),
                        api_key: provider.api_key.clone(),
                        base_url: base_url.clone(),
                        temperature: None,
                    },
                );
            }

            for name in &provider.embedding_models {
                embedding.insert(
                    &provider.key,
                    name,
                    EmbeddingModel {
                        provider: provider.key.clone(),
                        name: name.clone(),
                        api_key: provider.api_key.clone(),
                        base_url: base_url.clone(),
                    },
                );
            }
        }

        ModelResolver::new(chat, embedding, self.custom_openai.clone())
    }
}
