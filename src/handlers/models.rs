use axum::{Extension, Json};
use serde::Serialize;

use super::state::AppState;
use crate::domain::models::ModelCatalog;
use crate::domain::services::CUSTOM_OPENAI_PROVIDER;

#[derive(Debug, Serialize, PartialEq)]
pub struct ProviderModels {
    pub provider: String,
    pub models: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelListResponse {
    pub chat_model_providers: Vec<ProviderModels>,
    pub embedding_model_providers: Vec<ProviderModels>,
}

fn list_providers<M>(catalog: &ModelCatalog<M>) -> Vec<ProviderModels> {
    catalog
        .providers()
        .map(|p| ProviderModels {
            provider: p.key.clone(),
            models: p.model_names(),
        })
        .collect()
}

/// GET /api/models
/// Model names per provider, in fallback order. Credentials are never listed.
pub async fn list_models_handler(Extension(state): Extension<AppState>) -> Json<ModelListResponse> {
    let mut chat_model_providers = list_providers(state.models.chat_catalog());

    if let Some(custom) = state.models.custom_openai() {
        chat_model_providers.push(ProviderModels {
            provider: CUSTOM_OPENAI_PROVIDER.to_string(),
            models: vec![custom.model_name.clone()],
        });
    }

    Json(ModelListResponse {
        chat_model_providers,
        embedding_model_providers: list_providers(state.models.embedding_catalog()),
    })
}
