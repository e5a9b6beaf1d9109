//! LLM prompts for the problem-preparation tools.
//!
//! # Architecture
//!
//! - [`polygon`] - Prompts for Polygon contests (short descriptions, validators)
//! - [`topcoder`] - Prompts for the TopCoder archive (explanations and the
//!   ICPC conversion pipeline)
//!
//! Every builder returns a [`Prompt`], which turns into a
//! [`GenerationRequest`] with [`Prompt::into_request`].
//!
//! # Usage
//!
//! ```
//! use problem_forge::prompts::build_description_prompt;
//!
//! let prompt = build_description_prompt("A+B", "Legend: add two numbers.", "English");
//! assert!(prompt.system.is_none());
//! assert!(prompt.user[0].contains("exactly three sentences in English"));
//! ```

pub mod polygon;
pub mod topcoder;

use crate::llm::GenerationRequest;

pub use polygon::{build_description_prompt, build_validator_fix_prompt, build_validator_prompt};
pub use topcoder::{
    build_conversion_script_prompt, build_explanation_prompt, build_icpc_documentation_prompt,
    build_latex_prompt, build_section_split_prompt, build_solution_conversion_prompt,
    LATEX_SECTIONS,
};

/// A system context and the user turns that follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: Vec<String>,
}

impl Prompt {
    /// A single user message with no system context.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            system: None,
            user: vec![text.into()],
        }
    }

    pub fn with_system(system: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: vec![text.into()],
        }
    }

    /// Appends another user turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.user.push(text.into());
    }

    pub fn into_request(self) -> GenerationRequest {
        GenerationRequest::from_prompts(self.system.as_deref(), &self.user)
    }
}
