//! Shared utility functions for problem-forge.
//!
//! This module provides helpers used across the tools, including code
//! extraction from LLM replies.

pub mod code_blocks;

pub use code_blocks::{extract_code_block, extract_python_block, strip_code_fence};
