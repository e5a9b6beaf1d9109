//! Tools over the TopCoder archive: statement display, problem reports, LLM
//! explanations and conversion into ICPC packages.
//!
//! # Architecture
//!
//! - [`display`] - Reports printed by the inspection commands
//! - [`package`] - Package layout helpers (test ordering, section splitting)
//! - [`runner`] - Execution of generated conversion scripts
//! - [`convert`] - The conversion pipeline

pub mod convert;
pub mod display;
pub mod package;
pub mod runner;

pub use convert::{ConversionSummary, Converter, MAX_SCRIPT_ATTEMPTS};
pub use display::{format_description, format_not_found, format_problem, format_short_description};
pub use package::{annotated_description, order_test_cases, problem_dir_name, split_sections};
pub use runner::{InterpreterRunner, ScriptError, ScriptRunner, DEFAULT_PYTHON, SCRIPT_TIMEOUT};

use crate::error::LlmError;
use crate::llm::{complete, LlmProvider};
use crate::prompts::build_explanation_prompt;
use crate::store::{ProblemData, StoreError, TopcoderStore, EXAMPLE_NAME_LIMIT};

/// Looks `name` up; on a miss prints the not-found hint and returns `None`.
pub async fn find_or_report(
    store: &TopcoderStore,
    name: &str,
) -> Result<Option<ProblemData>, StoreError> {
    if let Some(data) = store.problem_data(name).await? {
        return Ok(Some(data));
    }

    let examples = store.example_problem_names(EXAMPLE_NAME_LIMIT).await?;
    println!("{}", format_not_found(name, &examples));
    Ok(None)
}

/// Asks the LLM for a formal explanation of a problem statement.
pub async fn explain(
    llm: &dyn LlmProvider,
    problem_name: &str,
    statement: &str,
) -> Result<String, LlmError> {
    let request = build_explanation_prompt(problem_name, statement)
        .into_request()
        .with_max_tokens(3000)
        .with_temperature(0.4);
    complete(llm, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedProvider;
    use crate::llm::Role;

    #[tokio::test]
    async fn test_explain_sends_system_context() {
        let llm = ScriptedProvider::new(["1. Summary"]);
        let text = explain(&llm, "Widgets", "Count widgets.").await.unwrap();
        assert_eq!(text, "1. Summary");

        let request = &llm.requests()[0];
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[1].content.contains("Problem Name: Widgets"));
        assert_eq!(request.max_tokens, Some(3000));
    }
}
