//! Short formal descriptions for Polygon contest problems.
//!
//! For every problem of the requested contests the statement is fetched from
//! Polygon, condensed by the LLM into three formal sentences and collected
//! into a CSV file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::llm::{complete, LlmProvider};
use crate::polygon::{fetch_statement_text, PolygonApi, PolygonProblem};
use crate::prompts::build_description_prompt;

/// Default CSV written by the `describe` command.
pub const DEFAULT_OUTPUT_FILE: &str = "problem_descriptions.csv";

/// Default language of the generated descriptions.
pub const DEFAULT_LANGUAGE: &str = "English";

/// One row of the output CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionRecord {
    pub contest_id: i64,
    pub problem_id: i64,
    pub problem_name: String,
    pub description: String,
}

/// Asks the LLM for three-sentence descriptions.
pub struct DescriptionGenerator {
    llm: Arc<dyn LlmProvider>,
    language: String,
}

impl DescriptionGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, language: impl Into<String>) -> Self {
        Self {
            llm,
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub async fn generate(&self, problem_name: &str, statement: &str) -> anyhow::Result<String> {
        let request =
            build_description_prompt(problem_name, statement, &self.language).into_request();
        let reply = complete(self.llm.as_ref(), request).await?;
        Ok(reply.trim().to_string())
    }
}

/// Walks contests and writes the descriptions of their problems.
pub struct DescriptionWriter {
    polygon: Arc<dyn PolygonApi>,
    generator: DescriptionGenerator,
}

impl DescriptionWriter {
    pub fn new(polygon: Arc<dyn PolygonApi>, generator: DescriptionGenerator) -> Self {
        Self { polygon, generator }
    }

    /// Describes every problem of `contest_ids` and writes the CSV to
    /// `output`. Returns the number of rows written.
    ///
    /// Contests that cannot be listed and problems that fail are logged and
    /// skipped. When nothing was generated no file is written.
    pub async fn process_contests(
        &self,
        contest_ids: &[i64],
        output: &Path,
    ) -> anyhow::Result<usize> {
        let records = self.collect(contest_ids).await;

        if records.is_empty() {
            warn!("No descriptions were generated");
            return Ok(0);
        }

        info!(count = records.len(), output = %output.display(), "Writing descriptions");
        write_csv(output, &records)?;
        info!(output = %output.display(), "Descriptions written");
        Ok(records.len())
    }

    /// Generates the descriptions without writing them.
    pub async fn collect(&self, contest_ids: &[i64]) -> Vec<DescriptionRecord> {
        info!(contests = contest_ids.len(), "Processing contests");
        let mut records = Vec::new();

        for &contest_id in contest_ids {
            info!(contest_id, "Processing contest");
            let problems = match self.polygon.contest_problems(contest_id).await {
                Ok(problems) => problems,
                Err(e) => {
                    error!(contest_id, error = %e, "Failed to get contest problems");
                    continue;
                }
            };
            info!(contest_id, problems = problems.len(), "Found problems in contest");

            for problem in problems.values() {
                match self.describe(problem).await {
                    Ok(description) => {
                        info!(problem = %problem.name, %description, "Generated description");
                        records.push(DescriptionRecord {
                            contest_id,
                            problem_id: problem.id,
                            problem_name: problem.name.clone(),
                            description,
                        });
                    }
                    Err(e) => {
                        error!(problem = %problem.name, error = %e, "Error processing problem");
                    }
                }
            }
        }

        records
    }

    async fn describe(&self, problem: &PolygonProblem) -> anyhow::Result<String> {
        info!(problem = %problem.name, problem_id = problem.id, "Processing problem");

        let statement = fetch_statement_text(self.polygon.as_ref(), problem).await?;
        info!(chars = statement.len(), "Got problem statement");

        self.generator.generate(&problem.name, &statement).await
    }
}

/// Writes `records` with a `contest_id,problem_id,problem_name,description`
/// header.
pub fn write_csv(path: &Path, records: &[DescriptionRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
