//! SurrealDB connection management
//!
//! Disk-backed databases live in `~/.chat-stream-hub/surreal/` unless the
//! storage config names another path.

use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

use super::schema::run_migrations;
use crate::config::{StorageBackend, StorageConfig};
use crate::infrastructure::store::StoreError;

/// Database connection wrapper
pub type Database = Arc<Surreal<Db>>;

/// Resolve the on-disk database directory, creating it if needed
fn get_db_path(config: &StorageConfig) -> Result<PathBuf, StoreError> {
    let db_path = match &config.path {
        Some(path) => path.clone(),
        None => dirs::home_dir()
            .ok_or_else(|| StoreError::Database("Could not determine home directory".to_string()))?
            .join(".chat-stream-hub")
            .join("surreal"),
    };

    std::fs::create_dir_all(&db_path).map_err(|e| {
        StoreError::Database(format!("Failed to create database directory: {}", e))
    })?;

    Ok(db_path)
}

/// Open the database named by the storage config and run migrations
pub async fn connect(config: &StorageConfig) -> Result<Database, StoreError> {
    let db = match config.backend {
        StorageBackend::SurrealMemory => {
            tracing::info!("Initializing in-memory SurrealDB");
            Surreal::new::<Mem>(())
                .await
                .map_err(|e| StoreError::Database(format!("Failed to start SurrealDB: {}", e)))?
        }
        _ => {
            let db_path = get_db_path(config)?;
            tracing::info!("Initializing SurrealDB at {:?}", db_path);
            Surreal::new::<RocksDb>(db_path)
                .await
                .map_err(|e| StoreError::Database(format!("Failed to connect to SurrealDB: {}", e)))?
        }
    };

    db.use_ns(config.namespace.clone())
        .use_db(config.database.clone())
        .await
        .map_err(|e| StoreError::Database(format!("Failed to select namespace/database: {}", e)))?;

    run_migrations(&db).await?;

    tracing::info!("SurrealDB initialized successfully");

    Ok(Arc::new(db))
}
