//! LLM integration for problem-forge.
//!
//! Every generation step in the tools goes through the [`LlmProvider`]
//! trait, so workflows can be driven by the HTTP [`ChatClient`] in
//! production and by scripted providers in tests.
//!
//! ```ignore
//! use problem_forge::config::LlmConfig;
//! use problem_forge::llm::{complete, ChatClient, GenerationRequest};
//!
//! let config = LlmConfig::resolve(Some(key), None, "gpt-4o")?;
//! let client = ChatClient::new(&config)?;
//! let request = GenerationRequest::from_prompts(Some("You are terse."), &[prompt])
//!     .with_max_tokens(3000)
//!     .with_temperature(0.4);
//! let text = complete(&client, request).await?;
//! ```

pub mod client;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    complete, ChatClient, Choice, ChoiceMessage, GenerationRequest, GenerationResponse,
    LlmProvider, Message, Role, Usage,
};
