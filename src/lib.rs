//! problem-forge: LLM-assisted tooling for competitive-programming problems.
//!
//! This library generates short descriptions and testlib validators for
//! Polygon contests, and inspects or converts TopCoder archive problems into
//! ICPC packages.

// Tools
pub mod cli;
pub mod descriptions;
pub mod topcoder;
pub mod validators;

// Services and data
pub mod config;
pub mod error;
pub mod javaser;
pub mod llm;
pub mod polygon;
pub mod prompts;
pub mod statement;
pub mod store;
pub mod utils;

// Re-export commonly used error types
pub use error::{ConfigError, LlmError, PolygonError};
