// Turn pipeline services
// Storage and transport sit behind traits, so everything here runs against the in-memory store in tests

pub mod model_resolver;
pub mod handler_registry;
pub mod file_details;
pub mod history_reconciler;
pub mod stream_bridge;
pub mod orchestrator;

pub use model_resolver::*;
pub use handler_registry::*;
pub use file_details::*;
pub use history_reconciler::*;
pub use stream_bridge::*;
pub use orchestrator::*;
