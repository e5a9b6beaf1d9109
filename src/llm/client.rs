//! OpenAI-compatible chat-completion client.
//!
//! Any endpoint speaking `POST {base}/chat/completions` with bearer auth
//! works: OpenAI itself, LiteLLM proxies, vLLM and the like.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::LlmError;

/// Long LaTeX generations need the headroom.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A chat-completion call. This is also the wire body: an empty `model`
/// is replaced by the client's default before sending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Optional system turn followed by the user turns, in order.
    pub fn from_prompts(system: Option<&str>, user: &[String]) -> Self {
        let messages = system
            .map(Message::system)
            .into_iter()
            .chain(user.iter().map(|turn| Message::user(turn.as_str())))
            .collect();
        Self::new("", messages)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn prompt_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.len()).sum()
    }
}

/// Decoded completion body. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl GenerationResponse {
    /// A single-choice assistant reply. Used by in-process providers.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                index: 0,
                message: ChoiceMessage {
                    role: Some(Role::Assistant),
                    content: Some(content.into()),
                },
                finish_reason: Some("stop".to_string()),
            }],
            ..Self::default()
        }
    }

    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// `content` is null for refusals and tool calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Anything that can answer a chat-completion request.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;
}

/// Sends `request` and returns the text of the first choice.
pub async fn complete(
    provider: &dyn LlmProvider,
    request: GenerationRequest,
) -> Result<String, LlmError> {
    tracing::debug!(
        turns = request.messages.len(),
        chars = request.prompt_chars(),
        "llm request"
    );

    let response = provider.generate(request).await?;
    if let Some(usage) = &response.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "llm reply"
        );
    }

    match response.first_content() {
        Some(text) => Ok(text.to_owned()),
        None => Err(LlmError::EmptyResponse),
    }
}

/// HTTP provider for OpenAI-compatible endpoints.
pub struct ChatClient {
    endpoint: String,
    api_key: String,
    default_model: String,
    http: Client,
}

impl ChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;

        Ok(Self {
            endpoint: format!(
                "{}/chat/completions",
                config.api_base.trim_end_matches('/')
            ),
            api_key: config.api_key.clone(),
            default_model: config.model.clone(),
            http,
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }
}

/// `{"error": {"message": ...}}`, the usual failure body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Maps a non-success status and its body to an [`LlmError`], preferring the
/// structured message when the body carries one.
fn status_error(status: StatusCode, body: String) -> LlmError {
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    };
    if status == StatusCode::TOO_MANY_REQUESTS {
        LlmError::RateLimited(message)
    } else {
        LlmError::ApiError {
            code: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl LlmProvider for ChatClient {
    async fn generate(&self, mut request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        if request.model.is_empty() {
            request.model = self.default_model.clone();
        }

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        response
            .json::<GenerationResponse>()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))
    }
}
