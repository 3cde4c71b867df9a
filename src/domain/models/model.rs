//! Model handles and the ordered catalogs they are resolved from

use serde::{Deserialize, Serialize};

/// Handle to a chat model on an OpenAI-compatible backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatModel {
    pub provider: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
}

/// Handle to an embedding model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingModel {
    pub provider: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Credentials for the synthetic `custom_openai` provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomOpenAiCredentials {
    pub api_key: String,
    pub model_name: String,
    pub api_url: String,
}

impl CustomOpenAiCredentials {
    /// Model name and URL are mandatory; the key may be empty for local servers
    pub fn is_usable(&self) -> bool {
        !self.model_name.trim().is_empty() && !self.api_url.trim().is_empty()
    }
}

/// Models offered by one provider, in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogProvider<M> {
    pub key: String,
    pub models: Vec<(String, M)>,
}

impl<M> CatalogProvider<M> {
    pub fn get(&self, name: &str) -> Option<&M> {
        self.models.iter().find(|(n, _)| n == name).map(|(_, m)| m)
    }

    pub fn first(&self) -> Option<&M> {
        self.models.first().map(|(_, m)| m)
    }

    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|(n, _)| n.clone()).collect()
    }
}

/// Provider -> model-name -> handle mapping.
///
/// Iteration order is insertion order, which makes the "first available"
/// fallback reproducible: it is whatever was registered first.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCatalog<M> {
    providers: Vec<CatalogProvider<M>>,
}

impl<M> Default for ModelCatalog<M> {
    fn default() -> Self {
        Self {
            providers: Vec::new(),
        }
    }
}

impl<M> ModelCatalog<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, appending its provider if unseen. Re-registering a
    /// name replaces the handle in place.
    pub fn insert(&mut self, provider: impl Into<String>, name: impl Into<String>, model: M) {
        let provider = provider.into();
        let name = name.into();

        let index = match self.providers.iter().position(|p| p.key == provider) {
            Some(index) => index,
            None => {
                self.providers.push(CatalogProvider {
                    key: provider,
                    models: Vec::new(),
                });
                self.providers.len() - 1
            }
        };

        let entry = &mut self.providers[index];
        match entry.models.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = model,
            None => entry.models.push((name, model)),
        }
    }

    pub fn provider(&self, key: &str) -> Option<&CatalogProvider<M>> {
        self.providers.iter().find(|p| p.key == key)
    }

    pub fn first_provider(&self) -> Option<&CatalogProvider<M>> {
        self.providers.first()
    }

    pub fn providers(&self) -> impl Iterator<Item = &CatalogProvider<M>> {
        self.providers.iter()
    }
}
