//! Error types for problem-forge operations.
//!
//! Defines the error types shared across subsystems:
//! - Chat-completion API interactions
//! - Polygon API interactions
//! - Credential and configuration resolution
//!
//! Store and decoder errors live next to their modules
//! ([`crate::store::StoreError`], [`crate::javaser::DecodeError`]).

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("LLM returned no content")]
    EmptyResponse,
}

/// Errors that can occur while talking to the Polygon API.
#[derive(Debug, Error)]
pub enum PolygonError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("HTTP request to '{method}' failed: {message}")]
    RequestFailed { method: String, message: String },

    #[error("Polygon rejected '{method}': {comment}")]
    Failed { method: String, comment: String },

    #[error("HTTP {code} from '{method}': {body}")]
    Http {
        method: String,
        code: u16,
        body: String,
    },

    #[error("Failed to parse response of '{method}': {message}")]
    ParseError { method: String, message: String },

    #[error("No statements found for problem {0}")]
    NoStatements(i64),
}

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing credential: {name}. {hint}")]
    MissingCredential { name: &'static str, hint: &'static str },
}
