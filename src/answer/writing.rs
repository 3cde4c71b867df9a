//! Writing assistant handler
//!
//! Streams a plain chat completion from an OpenAI-compatible backend, without
//! any search step. Never emits sources.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;

use super::traits::{
    AnswerHandler, AnswerRequest, AnswerSender, AnswerStream, HandlerError,
    ANSWER_CHANNEL_CAPACITY,
};
use crate::domain::models::HistoryRole;

/// Focus-mode key this handler is registered under
pub const WRITING_ASSISTANT_FOCUS_MODE: &str = "writingAssistant";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

const WRITING_PROMPT: &str = "You are a writing assistant. Help the user write, rewrite, \
summarize and proofread text. Answer directly, using Markdown where it helps readability. \
You do not have access to the internet; if the user needs up-to-date facts, say so.";

#[derive(Debug, Clone, Serialize, PartialEq)]
struct CompletionMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    stream: bool,
    messages: Vec<CompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// One parsed event of the completion SSE stream
#[derive(Debug, Clone, PartialEq)]
enum SseLine {
    Delta(String),
    Done,
    Failed(String),
    Skip,
}

/// Writing assistant backed by the resolved chat model
#[derive(Clone, Default)]
pub struct WritingAssistant {
    http: reqwest::Client,
}

impl WritingAssistant {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl AnswerHandler for WritingAssistant {
    fn name(&self) -> &'static str {
        "writing_assistant"
    }

    async fn search_and_answer(&self, request: AnswerRequest) -> Result<AnswerStream, HandlerError> {
        let base_url = request
            .chat_model
            .base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                HandlerError::UnsupportedModel(format!(
                    "{}/{} has no base URL",
                    request.chat_model.provider, request.chat_model.name
                ))
            })?;

        let url = format!("{}{}", base_url.trim_end_matches('/'), CHAT_COMPLETIONS_PATH);
        let body = CompletionRequest {
            model: request.chat_model.name.clone(),
            stream: true,
            messages: build_messages(&request),
            temperature: request.chat_model.temperature,
        };

        let mut builder = self.http.post(&url).json(&body);
        if let Some(key) = request.chat_model.api_key.as_deref().filter(|k| !k.is_empty()) {
            builder = builder.bearer_auth(key);
        }

        let (sender, stream) = AnswerStream::channel(ANSWER_CHANNEL_CAPACITY);

        tracing::debug!(
            model = %request.chat_model.name,
            url = %url,
            "Starting writing assistant completion"
        );

        tokio::spawn(async move {
            relay_completion(builder, sender).await;
        });

        Ok(stream)
    }
}

/// System prompt, prior turns, then the query
fn build_messages(request: &AnswerRequest) -> Vec<CompletionMessage> {
    let system = if request.system_instructions.trim().is_empty() {
        WRITING_PROMPT.to_string()
    } else {
        format!(
            "{}\n\n### User instructions\n{}",
            WRITING_PROMPT, request.system_instructions
        )
    };

    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(CompletionMessage {
        role: "system",
        content: system,
    });
    messages.extend(request.history.iter().map(|entry| CompletionMessage {
        role: match entry.role {
            HistoryRole::Human => "user",
            HistoryRole::Assistant => "assistant",
        },
        content: entry.text.clone(),
    }));
    messages.push(CompletionMessage {
        role: "user",
        content: request.query.clone(),
    });
    messages
}

/// Classify the data payload of one SSE event
fn parse_event_data(data: &str) -> SseLine {
    let data = data.trim();
    if data.is_empty() {
        return SseLine::Skip;
    }
    if data == "[DONE]" {
        return SseLine::Done;
    }

    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Skipping unparseable completion chunk: {}", e);
            return SseLine::Skip;
        }
    };

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown model error");
        return SseLine::Failed(message.to_string());
    }

    value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(|text| SseLine::Delta(text.to_string()))
        .unwrap_or(SseLine::Skip)
}

/// Drive the HTTP request and translate its SSE body into answer events
async fn relay_completion(builder: reqwest::RequestBuilder, sender: AnswerSender) {
    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Completion request failed: {}", e);
            sender.error(format!("Model request failed: {}", e)).await;
            return;
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, "Completion backend rejected request: {}", body);
        sender
            .error(format!("Model backend returned {}", status))
            .await;
        return;
    }

    let mut events = response.bytes_stream().eventsource();

    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("Completion stream interrupted: {}", e);
                sender.error(format!("Model stream interrupted: {}", e)).await;
                return;
            }
        };

        match parse_event_data(&event.data) {
            SseLine::Delta(text) => {
                if !sender.response(text).await {
                    tracing::debug!("Answer consumer went away, dropping completion stream");
                    return;
                }
            }
            SseLine::Done => {
                sender.end().await;
                return;
            }
            SseLine::Failed(message) => {
                sender.error(message).await;
                return;
            }
            SseLine::Skip => {}
        }
    }

    // Backend closed without [DONE]; what arrived is the answer
    sender.end().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ChatModel, EmbeddingModel, HistoryEntry, OptimizationMode};

    fn request(instructions: &str) -> AnswerRequest {
        AnswerRequest {
            query: "Fix my grammar".to_string(),
            history: vec![
                HistoryEntry::from_pair("human", "Hi"),
                HistoryEntry::from_pair("assistant", "Hello!"),
            ],
            chat_model: ChatModel {
                provider: "openai".into(),
                name: "gpt-4o-mini".into(),
                api_key: None,
                base_url: None,
                temperature: None,
            },
            embedding_model: EmbeddingModel {
                provider: "openai".into(),
                name: "text-embedding-3-small".into(),
                api_key: None,
                base_url: None,
            },
            optimization_mode: OptimizationMode::Balanced,
            file_ids: vec![],
            system_instructions: instructions.to_string(),
        }
    }

    #[test]
    fn test_build_messages_order() {
        let messages = build_messages(&request(""));
        let roles: Vec<&str> = messages.iter().map(|m| m.role).collect();

        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[0].content, WRITING_PROMPT);
        assert_eq!(messages[3].content, "Fix my grammar");
    }

    #[test]
    fn test_build_messages_appends_instructions() {
        let messages = build_messages(&request("Answer in French"));
        assert!(messages[0].content.ends_with("Answer in French"));
    }

    #[test]
    fn test_parse_event_data() {
        assert_eq!(
            parse_event_data(r#"{"choices":[{"delta":{"content":"Hel"}}]}"#),
            SseLine::Delta("Hel".to_string())
        );
        assert_eq!(parse_event_data("[DONE]"), SseLine::Done);
        assert_eq!(
            parse_event_data(r#"{"error":{"message":"quota exceeded"}}"#),
            SseLine::Failed("quota exceeded".to_string())
        );
        assert_eq!(parse_event_data(""), SseLine::Skip);
        assert_eq!(
            parse_event_data(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#),
            SseLine::Skip
        );
        assert_eq!(parse_event_data("not json"), SseLine::Skip);
    }

    #[tokio::test]
    async fn test_events_reassembled_across_chunks() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"caf\u{e9}\"}}]}\n\ndata: [DONE]\n\n";
        let bytes = body.as_bytes();
        // Cut mid-event, inside the JSON payload
        let cut = body.find("delta").unwrap();
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
            vec![Ok(bytes[..cut].to_vec()), Ok(bytes[cut..].to_vec())];

        let parsed: Vec<SseLine> = futures::stream::iter(chunks)
            .eventsource()
            .map(|event| parse_event_data(&event.unwrap().data))
            .collect()
            .await;

        assert_eq!(parsed, vec![SseLine::Delta("caf\u{e9}".to_string()), SseLine::Done]);
    }

    #[tokio::test]
    async fn test_missing_base_url_is_rejected() {
        let handler = WritingAssistant::default();
        let result = handler.search_and_answer(request("")).await;
        assert!(matches!(result, Err(HandlerError::UnsupportedModel(_))));
    }
}
