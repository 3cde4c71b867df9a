//! Handler replaying a fixed event script, for pipeline tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::traits::{AnswerEvent, AnswerHandler, AnswerRequest, AnswerStream, HandlerError};

pub struct ScriptedHandler {
    events: Vec<AnswerEvent>,
    fail_start: bool,
    last_request: Mutex<Option<AnswerRequest>>,
}

impl ScriptedHandler {
    pub fn new(events: Vec<AnswerEvent>) -> Self {
        Self {
            events,
            fail_start: false,
            last_request: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn last_request(&self) -> Option<AnswerRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerHandler for ScriptedHandler {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn search_and_answer(&self, request: AnswerRequest) -> Result<AnswerStream, HandlerError> {
        *self.last_request.lock().unwrap() = Some(request);
        if self.fail_start {
            return Err(HandlerError::StartFailed("scripted failure".to_string()));
        }
        Ok(AnswerStream::from_events(self.events.clone()))
    }
}
