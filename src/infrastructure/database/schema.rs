//! Database schema definitions and migrations
//!
//! Defines tables for: chat, message, counter
//! Uses SurrealQL for schema definitions

use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use crate::infrastructure::store::StoreError;

/// Run all database migrations
pub async fn run_migrations(db: &Surreal<Db>) -> Result<(), StoreError> {
    tracing::info!("Running database migrations...");

    create_chat_table(db).await?;
    create_message_table(db).await?;
    create_counter_table(db).await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

async fn create_chat_table(db: &Surreal<Db>) -> Result<(), StoreError> {
    db.query(r#"
        DEFINE TABLE IF NOT EXISTS chat SCHEMALESS;

        DEFINE FIELD IF NOT EXISTS chat_id ON chat TYPE string;
        DEFINE FIELD IF NOT EXISTS title ON chat TYPE string;
        DEFINE FIELD IF NOT EXISTS created_at ON chat TYPE string;
        DEFINE FIELD IF NOT EXISTS focus_mode ON chat TYPE string;
        DEFINE FIELD IF NOT EXISTS files ON chat TYPE array DEFAULT [];

        DEFINE INDEX IF NOT EXISTS idx_chat_chat_id ON chat FIELDS chat_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_chat_created ON chat FIELDS created_at;
    "#)
    .await
    .map_err(|e| StoreError::Database(format!("Failed to create chat table: {}", e)))?;

    Ok(())
}

async fn create_message_table(db: &Surreal<Db>) -> Result<(), StoreError> {
    db.query(r#"
        DEFINE TABLE IF NOT EXISTS message SCHEMALESS;

        DEFINE FIELD IF NOT EXISTS seq ON message TYPE int;
        DEFINE FIELD IF NOT EXISTS chat_id ON message TYPE string;
        DEFINE FIELD IF NOT EXISTS message_id ON message TYPE string;
        DEFINE FIELD IF NOT EXISTS role ON message TYPE string;
        DEFINE FIELD IF NOT EXISTS content ON message TYPE option<string>;
        DEFINE FIELD IF NOT EXISTS sources ON message TYPE option<array>;
        DEFINE FIELD IF NOT EXISTS created_at ON message TYPE string;

        DEFINE INDEX IF NOT EXISTS idx_msg_seq ON message FIELDS seq UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_msg_chat ON message FIELDS chat_id;
        DEFINE INDEX IF NOT EXISTS idx_msg_chat_message ON message FIELDS chat_id, message_id;
    "#)
    .await
    .map_err(|e| StoreError::Database(format!("Failed to create message table: {}", e)))?;

    Ok(())
}

async fn create_counter_table(db: &Surreal<Db>) -> Result<(), StoreError> {
    db.query(r#"
        DEFINE TABLE IF NOT EXISTS counter SCHEMALESS;

        DEFINE FIELD IF NOT EXISTS current ON counter TYPE int DEFAULT 0;
    "#)
    .await
    .map_err(|e| StoreError::Database(format!("Failed to create counter table: {}", e)))?;

    Ok(())
}
