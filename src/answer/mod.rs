//! Answer-producing handlers
//!
//! Handlers turn a query plus conversation context into an [`AnswerStream`]
//! of typed events. The orchestrator only consumes that event contract.

pub mod traits;
pub mod writing;

pub use traits::{AnswerEvent, AnswerHandler, AnswerRequest, AnswerSender, AnswerStream, HandlerError};
pub use writing::{WritingAssistant, WRITING_ASSISTANT_FOCUS_MODE};

#[cfg(test)]
pub(crate) mod scripted;
