// Persistence: the ChatStore seam plus its SurrealDB and in-memory backends

pub mod database;
pub mod store;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};

pub use database::SurrealChatStore;
pub use store::{ChatStore, MemoryChatStore, StoreError};

/// Open the configured chat store
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn ChatStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory chat store (history is not persisted)");
            Ok(Arc::new(MemoryChatStore::new()))
        }
        StorageBackend::Surreal | StorageBackend::SurrealMemory => {
            let db = database::connect(config).await?;
            Ok(Arc::new(SurrealChatStore::new(db)))
        }
    }
}
