//! Auto-generated testlib validators for Polygon problems.
//!
//! Problems of a contest that have no validator get one generated by the LLM
//! from the statement (and the first test, when available). The validator is
//! uploaded, designated and committed; when Polygon rejects it, the error is
//! fed back to the LLM for a corrected version.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::PolygonError;
use crate::llm::{complete, LlmProvider};
use crate::polygon::{fetch_statement_text, PolygonApi, PolygonProblem};
use crate::prompts::{build_validator_fix_prompt, build_validator_prompt, Prompt};
use crate::utils::strip_code_fence;

/// Maximum number of upload attempts per problem.
pub const MAX_UPLOAD_ATTEMPTS: usize = 5;

/// Name of the uploaded validator source.
pub const VALIDATOR_FILE: &str = "validator.cpp";

/// Commit message used after a successful upload.
pub const COMMIT_MESSAGE: &str = "Added auto-generated validator";

/// Testsets probed, in order, for the first test input.
const TESTSETS: &[&str] = &["tests", "samples"];

/// Sampling temperature for validator generation.
const TEMPERATURE: f64 = 1.0;

/// Generates and repairs validators through the LLM.
pub struct ValidatorGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl ValidatorGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        problem_name: &str,
        statement: &str,
        test_input: Option<&str>,
    ) -> anyhow::Result<String> {
        self.ask(build_validator_prompt(problem_name, statement, test_input))
            .await
    }

    /// Asks for a corrected version of `code` given the upload `error`.
    pub async fn fix(
        &self,
        problem_name: &str,
        statement: &str,
        test_input: Option<&str>,
        code: &str,
        error: &str,
    ) -> anyhow::Result<String> {
        self.ask(build_validator_fix_prompt(
            problem_name,
            statement,
            test_input,
            code,
            error,
        ))
        .await
    }

    async fn ask(&self, prompt: Prompt) -> anyhow::Result<String> {
        let request = prompt.into_request().with_temperature(TEMPERATURE);
        let reply = complete(self.llm.as_ref(), request).await?;
        Ok(strip_code_fence(&reply, "cpp"))
    }
}

/// Outcome of processing one contest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorReport {
    /// Problems found without a validator, in contest order.
    pub missing: Vec<PolygonProblem>,
    /// Ids of the problems that received a validator.
    pub succeeded: Vec<i64>,
}

impl ValidatorReport {
    pub fn attempted(&self) -> usize {
        self.missing.len()
    }
}

/// Adds validators to the problems of a contest.
pub struct ValidatorWriter {
    polygon: Arc<dyn PolygonApi>,
    generator: ValidatorGenerator,
}

impl ValidatorWriter {
    pub fn new(polygon: Arc<dyn PolygonApi>, generator: ValidatorGenerator) -> Self {
        Self { polygon, generator }
    }

    /// Processes every problem of `contest_id` lacking a validator.
    ///
    /// Listing the contest is the only fatal step; per-problem failures are
    /// logged and the loop continues. With `dry_run` the problems are only
    /// reported.
    pub async fn process_contest(
        &self,
        contest_id: i64,
        dry_run: bool,
    ) -> Result<ValidatorReport, PolygonError> {
        info!(contest_id, "Processing contest");
        let problems = self.polygon.contest_problems(contest_id).await?;
        info!(problems = problems.len(), "Found problems in contest");

        let mut report = ValidatorReport::default();
        for problem in problems.values() {
            if self.has_validator(problem).await {
                info!(problem = %problem.name, "Already has validator");
            } else {
                info!(problem = %problem.name, "No validator found");
                report.missing.push(problem.clone());
            }
        }

        if report.missing.is_empty() {
            info!("All problems already have validators");
            return Ok(report);
        }
        info!(count = report.missing.len(), "Found problems without validators");

        if dry_run {
            info!("Dry run, would process the following problems:");
            for problem in &report.missing {
                info!("  - {} (ID: {})", problem.name, problem.id);
            }
            return Ok(report);
        }

        for problem in &report.missing {
            match self.process_problem(problem).await {
                Ok(true) => report.succeeded.push(problem.id),
                Ok(false) => {
                    error!(
                        problem = %problem.name,
                        attempts = MAX_UPLOAD_ATTEMPTS,
                        "Failed to add validator"
                    );
                }
                Err(e) => error!(problem = %problem.name, error = %e, "Error processing problem"),
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            attempted = report.attempted(),
            "Completed processing, added validators to {}/{} problems",
            report.succeeded.len(),
            report.attempted()
        );
        Ok(report)
    }

    /// A failed lookup counts as "no validator".
    async fn has_validator(&self, problem: &PolygonProblem) -> bool {
        match self.polygon.problem_validator(problem.id).await {
            Ok(name) => !name.trim().is_empty(),
            Err(e) => {
                warn!(problem = %problem.name, error = %e, "Could not check validator");
                false
            }
        }
    }

    /// Input of test 1 from the first testset that has one.
    pub async fn first_test_input(&self, problem_id: i64) -> Option<String> {
        for testset in TESTSETS {
            match self
                .polygon
                .problem_test_input(problem_id, testset, 1)
                .await
            {
                Ok(input) => return Some(input.trim().to_string()),
                Err(e) => tracing::debug!(problem_id, testset, error = %e, "No first test"),
            }
        }
        None
    }

    /// Returns whether a validator was committed.
    async fn process_problem(&self, problem: &PolygonProblem) -> anyhow::Result<bool> {
        info!(problem = %problem.name, "Processing problem");

        let statement = fetch_statement_text(self.polygon.as_ref(), problem).await?;
        info!(chars = statement.len(), "Got problem statement");

        let test_input = self.first_test_input(problem.id).await;
        if test_input.is_some() {
            info!("Retrieved first test case for format understanding");
        } else {
            info!("No test case available, proceeding with statement only");
        }

        let mut code = self
            .generator
            .generate(&problem.name, &statement, test_input.as_deref())
            .await?;
        info!(chars = code.len(), "Generated validator");

        for attempt in 1..=MAX_UPLOAD_ATTEMPTS {
            let error = match self.upload(problem.id, &code).await {
                Ok(()) => {
                    info!(problem = %problem.name, attempt, "Added validator");
                    return Ok(true);
                }
                Err(e) => e.to_string(),
            };
            error!(problem = %problem.name, attempt, %error, "Upload failed");

            if attempt < MAX_UPLOAD_ATTEMPTS {
                info!(attempt, max = MAX_UPLOAD_ATTEMPTS, "Regenerating validator");
                code = self
                    .generator
                    .fix(&problem.name, &statement, test_input.as_deref(), &code, &error)
                    .await?;
            }
        }

        Ok(false)
    }

    async fn upload(&self, problem_id: i64, code: &str) -> Result<(), PolygonError> {
        self.polygon.update_working_copy(problem_id).await?;
        self.polygon
            .save_source_file(problem_id, VALIDATOR_FILE, code)
            .await?;
        self.polygon.set_validator(problem_id, VALIDATOR_FILE).await?;
        self.polygon
            .commit_changes(problem_id, true, COMMIT_MESSAGE)
            .await
    }
}
