//! Focus mode -> answer handler lookup

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::answer::AnswerHandler;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid focus mode")]
    UnknownFocusMode(String),
}

/// Registered answer handlers keyed by focus mode
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn AnswerHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for the same focus mode
    pub fn register(&mut self, focus_mode: impl Into<String>, handler: Arc<dyn AnswerHandler>) {
        self.handlers.insert(focus_mode.into(), handler);
    }

    pub fn with_handler(
        mut self,
        focus_mode: impl Into<String>,
        handler: Arc<dyn AnswerHandler>,
    ) -> Self {
        self.register(focus_mode, handler);
        self
    }

    pub fn dispatch(&self, focus_mode: &str) -> Result<Arc<dyn AnswerHandler>, DispatchError> {
        self.handlers
            .get(focus_mode)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownFocusMode(focus_mode.to_string()))
    }

    /// Registered focus modes, sorted
    pub fn focus_modes(&self) -> Vec<&str> {
        let mut modes: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        modes.sort_unstable();
        modes
    }
}
