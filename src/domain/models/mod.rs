// Domain models (business entities)
// Pure Rust, no framework dependencies

pub mod chat;
pub mod message;
pub mod turn;
pub mod frame;
pub mod model;

pub use chat::{same_file_set, Chat, FileDescriptor};
pub use message::{generate_message_id, Citation, Message, MessageRole, NewMessage};
pub use turn::{HistoryEntry, HistoryRole, ModelSelection, OptimizationMode, Turn};
pub use frame::StreamFrame;
pub use model::{
    CatalogProvider, ChatModel, CustomOpenAiCredentials, EmbeddingModel, ModelCatalog,
};
