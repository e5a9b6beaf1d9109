//! Scripted provider used by workflow tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{GenerationRequest, GenerationResponse, LlmProvider};
use crate::error::LlmError;

/// Replays canned replies in order and records every request it saw.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a failing call.
    pub fn push_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()));

        match reply {
            Ok(content) => Ok(GenerationResponse::from_text(content)),
            Err(message) => Err(LlmError::RequestFailed(message)),
        }
    }
}
