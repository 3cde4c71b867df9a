//! Repository layer for database operations
//!
//! Provides type-safe CRUD operations for:
//! - Chats
//! - Messages

pub mod chat_repo;
pub mod message_repo;

pub use chat_repo::{ChatRecord, ChatRepository};
pub use message_repo::{MessageRecord, MessageRepository};
