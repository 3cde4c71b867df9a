//! Chooses the chat and embedding model for a turn

use thiserror::Error;

use crate::domain::models::{
    ChatModel, CustomOpenAiCredentials, EmbeddingModel, ModelCatalog, ModelSelection,
};

/// Provider key that bypasses the catalog and uses configured credentials
pub const CUSTOM_OPENAI_PROVIDER: &str = "custom_openai";

/// Sampling temperature for `custom_openai` chat models
pub const CUSTOM_OPENAI_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Invalid chat model")]
    InvalidChatModel,

    #[error("Invalid embedding model")]
    InvalidEmbeddingModel,
}

/// Model catalogs plus optional `custom_openai` credentials.
///
/// When a selection leaves the provider or name unset, the first entry of
/// the catalog in configuration order is used.
#[derive(Debug, Clone, Default)]
pub struct ModelResolver {
    chat: ModelCatalog<ChatModel>,
    embedding: ModelCatalog<EmbeddingModel>,
    custom: Option<CustomOpenAiCredentials>,
}

impl ModelResolver {
    pub fn new(
        chat: ModelCatalog<ChatModel>,
        embedding: ModelCatalog<EmbeddingModel>,
        custom: Option<CustomOpenAiCredentials>,
    ) -> Self {
        Self {
            chat,
            embedding,
            custom: custom.filter(CustomOpenAiCredentials::is_usable),
        }
    }

    pub fn chat_catalog(&self) -> &ModelCatalog<ChatModel> {
        &self.chat
    }

    pub fn embedding_catalog(&self) -> &ModelCatalog<EmbeddingModel> {
        &self.embedding
    }

    pub fn custom_openai(&self) -> Option<&CustomOpenAiCredentials> {
        self.custom.as_ref()
    }

    pub fn resolve_chat(&self, selection: &ModelSelection) -> Result<ChatModel, ResolveError> {
        if selected(&selection.provider) == Some(CUSTOM_OPENAI_PROVIDER) {
            let creds = self.custom.as_ref().ok_or(ResolveError::InvalidChatModel)?;
            return Ok(ChatModel {
                provider: CUSTOM_OPENAI_PROVIDER.to_string(),
                name: creds.model_name.clone(),
                api_key: Some(creds.api_key.clone()).filter(|k| !k.is_empty()),
                base_url: Some(creds.api_url.clone()),
                temperature: Some(CUSTOM_OPENAI_TEMPERATURE),
            });
        }

        pick(&self.chat, selection)
            .cloned()
            .ok_or(ResolveError::InvalidChatModel)
    }

    pub fn resolve_embedding(
        &self,
        selection: &ModelSelection,
    ) -> Result<EmbeddingModel, ResolveError> {
        pick(&self.embedding, selection)
            .cloned()
            .ok_or(ResolveError::InvalidEmbeddingModel)
    }
}

fn selected(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn pick<'a, M>(catalog: &'a ModelCatalog<M>, selection: &ModelSelection) -> Option<&'a M> {
    let provider = match selected(&selection.provider) {
        Some(key) => catalog.provider(key)?,
        None => catalog.first_provider()?,
    };

    match selected(&selection.name) {
        Some(name) => provider.get(name),
        None => provider.first(),
    }
}
