//! Chat request parsing with itemized field errors

use serde_json::{Map, Value};

use crate::domain::models::{HistoryEntry, ModelSelection, OptimizationMode, Turn};
use crate::shared::errors::FieldError;

/// Validated `POST /api/chat` body
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub turn: Turn,
    pub optimization_mode: OptimizationMode,
    pub focus_mode: String,
    pub history: Vec<HistoryEntry>,
    pub files: Vec<String>,
    pub chat_model: ModelSelection,
    pub embedding_model: ModelSelection,
    /// `None` when absent or null
    pub system_instructions: Option<String>,
}

/// Collects every problem instead of stopping at the first one
#[derive(Default)]
struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn fail(&mut self, path: &str, message: &str) {
        self.errors.push(FieldError::new(path, message));
    }

    fn required_string(&mut self, object: &Map<String, Value>, key: &str, path: &str, message: &str) -> String {
        match object.get(key) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                self.fail(path, message);
                String::new()
            }
        }
    }

    fn optional_string(&mut self, object: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.fail(path, &format!("{} must be a string", key));
                None
            }
        }
    }

    fn turn(&mut self, body: &Map<String, Value>) -> Turn {
        let Some(Value::Object(message)) = body.get("message") else {
            self.fail("message", "Message is required");
            return Turn {
                message_id: String::new(),
                chat_id: String::new(),
                content: String::new(),
            };
        };

        Turn {
            message_id: self.required_string(message, "messageId", "message.messageId", "Message ID is required"),
            chat_id: self.required_string(message, "chatId", "message.chatId", "Chat ID is required"),
            content: self.required_string(message, "content", "message.content", "Message content is required"),
        }
    }

    fn optimization_mode(&mut self, body: &Map<String, Value>) -> OptimizationMode {
        let parsed = body
            .get("optimizationMode")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok());

        parsed.unwrap_or_else(|| {
            self.fail(
                "optimizationMode",
                "Optimization mode must be one of: speed, balanced, quality",
            );
            OptimizationMode::default()
        })
    }

    fn history(&mut self, body: &Map<String, Value>) -> Vec<HistoryEntry> {
        let entries = match body.get("history") {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                self.fail("history", "History must be an array of [role, text] pairs");
                return Vec::new();
            }
        };

        let mut history = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match entry.as_array().map(Vec::as_slice) {
                Some([Value::String(role), Value::String(text)]) => {
                    history.push(HistoryEntry::from_pair(role, text.clone()));
                }
                _ => self.fail(
                    &format!("history.{}", index),
                    "History entries must be [role, text] pairs",
                ),
            }
        }
        history
    }

    fn files(&mut self, body: &Map<String, Value>) -> Vec<String> {
        let ids = match body.get("files") {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(ids)) => ids,
            Some(_) => {
                self.fail("files", "Files must be an array of file ids");
                return Vec::new();
            }
        };

        let mut files = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            match id {
                Value::String(id) => files.push(id.clone()),
                _ => self.fail(&format!("files.{}", index), "File id must be a string"),
            }
        }
        files
    }

    fn model_selection(&mut self, body: &Map<String, Value>, key: &str) -> ModelSelection {
        match body.get(key) {
            None | Some(Value::Null) => ModelSelection::default(),
            Some(Value::Object(selection)) => ModelSelection {
                provider: self.optional_string(selection, "provider", &format!("{}.provider", key)),
                name: self.optional_string(selection, "name", &format!("{}.name", key)),
            },
            Some(_) => {
                self.fail(key, &format!("{} must be an object", key));
                ModelSelection::default()
            }
        }
    }
}

/// Parse and validate a raw chat request body
pub fn parse_chat_request(body: &[u8]) -> Result<ChatRequest, Vec<FieldError>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| vec![FieldError::new("", format!("Malformed JSON: {}", e))])?;

    let Value::Object(body) = value else {
        return Err(vec![FieldError::new("", "Request body must be a JSON object")]);
    };

    let mut v = Validator::default();

    let turn = v.turn(&body);
    let optimization_mode = v.optimization_mode(&body);
    let focus_mode = v.required_string(
        &body,
        "focusMode",
        "focusMode",
        "Invalid focus mode: focus mode is required",
    );
    let history = v.history(&body);
    let files = v.files(&body);
    let chat_model = v.model_selection(&body, "chatModel");
    let embedding_model = v.model_selection(&body, "embeddingModel");
    let system_instructions = v.optional_string(&body, "systemInstructions", "systemInstructions");

    if !v.errors.is_empty() {
        return Err(v.errors);
    }

    Ok(ChatRequest {
        turn,
        optimization_mode,
        focus_mode,
        history,
        files,
        chat_model,
        embedding_model,
        system_instructions,
    })
}
