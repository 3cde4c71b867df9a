use std::sync::Arc;

use crate::answer::{WritingAssistant, WRITING_ASSISTANT_FOCUS_MODE};
use crate::config::AppConfig;
use crate::domain::services::{
    FileDescriber, HandlerRegistry, HistoryReconciler, ModelResolver, UploadsFileDescriber,
};
use crate::infrastructure::ChatStore;

/// Shared state for all API handlers (passed as an `Extension`)
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChatStore>,
    pub models: Arc<ModelResolver>,
    pub handlers: Arc<HandlerRegistry>,
    pub files: Arc<dyn FileDescriber>,
    pub default_system_instructions: String,
}

impl AppState {
    /// State with the built-in handlers registered
    pub fn from_config(config: &AppConfig, store: Arc<dyn ChatStore>) -> Self {
        let handlers = HandlerRegistry::new().with_handler(
            WRITING_ASSISTANT_FOCUS_MODE,
            Arc::new(WritingAssistant::new(reqwest::Client::new())),
        );

        tracing::info!(
            focus_modes = ?handlers.focus_modes(),
            providers = config.providers.len(),
            "Chat handlers initialized"
        );

        Self {
            store,
            models: Arc::new(config.model_resolver()),
            handlers: Arc::new(handlers),
            files: Arc::new(UploadsFileDescriber::new(config.uploads.dir.clone())),
            default_system_instructions: config.chat.system_instructions.clone(),
        }
    }

    pub fn reconciler(&self) -> HistoryReconciler {
        HistoryReconciler::new(self.store.clone(), self.files.clone())
    }
}
