//! TopCoder to ICPC package conversion.
//!
//! The pipeline is fixed: original tests, format documentation, a generated
//! test conversion script (retried on failure), converted solutions and the
//! olymp.sty statement split into sections. Every transformation step is
//! delegated to the LLM.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::package::{
    annotated_description, order_test_cases, problem_dir_name, split_sections, OrderedTest,
};
use super::runner::ScriptRunner;
use crate::javaser::decode_args_or_raw;
use crate::llm::{complete, GenerationRequest, LlmProvider};
use crate::prompts::{
    build_conversion_script_prompt, build_icpc_documentation_prompt, build_latex_prompt,
    build_section_split_prompt, build_solution_conversion_prompt, LATEX_SECTIONS,
};
use crate::store::ProblemData;
use crate::utils::{extract_code_block, extract_python_block, strip_code_fence};

/// Maximum number of generated conversion scripts per problem.
pub const MAX_SCRIPT_ATTEMPTS: usize = 10;

/// Decoded tests shown to the LLM as format examples.
const EXAMPLE_TESTS: usize = 3;

pub const DOCUMENTATION_FILE: &str = "icpc_format_documentation.md";
pub const SCRIPT_FILE: &str = "convert_tests.py";

/// Token and temperature settings per step.
const DEFAULT_MAX_TOKENS: u32 = 3000;
const DEFAULT_TEMPERATURE: f64 = 0.4;
const SCRIPT_MAX_TOKENS: u32 = 4000;
const SOLUTION_MAX_TOKENS: u32 = 4000;
const SOLUTION_TEMPERATURE: f64 = 0.3;
const LATEX_MAX_TOKENS: u32 = 16000;
const SPLIT_TEMPERATURE: f64 = 0.2;

/// What a conversion produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionSummary {
    pub package_dir: PathBuf,
    /// Tests written to `original_tests/`.
    pub tests: usize,
    /// Whether a conversion script ran successfully on every test.
    pub tests_converted: bool,
    /// Script generations used.
    pub script_attempts: usize,
    pub solutions_written: usize,
    /// Sections written to `statements/latex/`.
    pub sections: Vec<String>,
}

impl ConversionSummary {
    /// Human-readable listing of the package contents.
    pub fn report(&self) -> String {
        let mut lines = vec![
            "\nConversion completed successfully!".to_string(),
            format!("Output directory: {}", self.package_dir.display()),
            format!("- ICPC documentation: {}", DOCUMENTATION_FILE),
            "- Original test cases: original_tests/".to_string(),
        ];
        if self.tests > 0 {
            lines.push(format!("- Test conversion script: {}", SCRIPT_FILE));
            if self.tests_converted {
                lines.push("- Converted test cases: tests/".to_string());
            } else {
                lines.push("- Converted test cases: none (no working script)".to_string());
            }
        }
        if self.solutions_written > 0 {
            lines.push(format!(
                "- Converted solutions: solutions/ ({} solutions)",
                self.solutions_written
            ));
        }
        lines.push("- LaTeX statement: statements/problem.tex".to_string());
        lines.push(format!("- LaTeX sections: statements/latex/ ({})", self.sections.join(", ")));
        lines.join("\n")
    }
}

/// Converts a looked-up problem into a package under `output_dir`.
pub struct Converter {
    llm: Arc<dyn LlmProvider>,
    runner: Arc<dyn ScriptRunner>,
    output_dir: PathBuf,
}

impl Converter {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        runner: Arc<dyn ScriptRunner>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            llm,
            runner,
            output_dir: output_dir.into(),
        }
    }

    pub async fn convert(&self, data: &ProblemData) -> anyhow::Result<ConversionSummary> {
        let name = data.problem.name.as_str();
        let statement = data
            .statement
            .as_deref()
            .with_context(|| format!("No statement found for problem '{}'", name))?;
        let description = annotated_description(statement, &data.sample_cases);

        let package_dir = self.output_dir.join(problem_dir_name(name));
        fs::create_dir_all(&package_dir)
            .with_context(|| format!("Failed to create {}", package_dir.display()))?;
        info!(problem = name, dir = %package_dir.display(), "Converting problem");

        let mut summary = ConversionSummary {
            package_dir: package_dir.clone(),
            ..Default::default()
        };

        // Original tests
        let ordered = order_test_cases(&data.test_cases, &data.sample_cases);
        let (originals, decoded) = write_original_tests(&package_dir, &ordered)?;
        summary.tests = originals.len();
        let examples = &decoded[..decoded.len().min(EXAMPLE_TESTS)];

        // Format documentation
        info!("Generating ICPC format documentation");
        let documentation = self
            .ask(
                build_icpc_documentation_prompt(&description, name, examples).into_request(),
                DEFAULT_MAX_TOKENS,
                DEFAULT_TEMPERATURE,
            )
            .await
            .context("Failed to generate ICPC format documentation")?;
        write_file(&package_dir.join(DOCUMENTATION_FILE), &documentation)?;

        // Test conversion
        if originals.is_empty() {
            warn!("No test cases found for this problem");
        } else {
            let (converted, attempts) = self
                .convert_tests(&package_dir, &documentation, examples, name, &originals)
                .await?;
            summary.tests_converted = converted;
            summary.script_attempts = attempts;
        }

        // Solutions
        summary.solutions_written = self
            .convert_solutions(&package_dir, data, &documentation)
            .await?;

        // Statement
        summary.sections = self
            .write_statement(&package_dir, &description, &documentation, name)
            .await?;

        Ok(summary)
    }

    /// Generates and runs conversion scripts until one converts every test.
    /// Returns whether one succeeded and how many were generated.
    async fn convert_tests(
        &self,
        package_dir: &Path,
        documentation: &str,
        examples: &[String],
        name: &str,
        originals: &[PathBuf],
    ) -> anyhow::Result<(bool, usize)> {
        let script_path = package_dir.join(SCRIPT_FILE);
        let tests_dir = package_dir.join("tests");
        fs::create_dir_all(&tests_dir)?;

        let mut feedback = String::new();
        for attempt in 1..=MAX_SCRIPT_ATTEMPTS {
            info!(attempt, max = MAX_SCRIPT_ATTEMPTS, "Generating test conversion script");
            let request =
                build_conversion_script_prompt(documentation, examples, name, &feedback)
                    .into_request();
            let script = match self
                .ask(request, SCRIPT_MAX_TOKENS, DEFAULT_TEMPERATURE)
                .await
            {
                Ok(reply) => extract_python_block(&reply),
                Err(e) => {
                    error!(attempt, error = %e, "Failed to generate test conversion script");
                    continue;
                }
            };
            write_file(&script_path, &script)?;

            match self.run_script(&script_path, originals, &tests_dir).await {
                Ok(()) => {
                    info!(attempt, tests = originals.len(), "Converted all test cases");
                    return Ok((true, attempt));
                }
                Err(e) => {
                    warn!(attempt, error = %format!("{:#}", e), "Conversion script failed");
                    feedback = format!("The script:\n{}\n{:#}", script, e);
                }
            }
        }

        error!(
            attempts = MAX_SCRIPT_ATTEMPTS,
            "Failed to generate a working test conversion script"
        );
        Ok((false, MAX_SCRIPT_ATTEMPTS))
    }

    async fn run_script(
        &self,
        script: &Path,
        originals: &[PathBuf],
        tests_dir: &Path,
    ) -> anyhow::Result<()> {
        for (i, input) in originals.iter().enumerate() {
            let file_name = input
                .file_name()
                .with_context(|| format!("Invalid test path {}", input.display()))?;
            let output = tests_dir.join(file_name);
            self.runner
                .run(script, input, &output)
                .await
                .with_context(|| format!("Error converting test case {}", i + 1))?;
            info!(test = i + 1, "Converted test case");
        }
        Ok(())
    }

    /// Failed conversions are logged and skipped; returns the number written.
    async fn convert_solutions(
        &self,
        package_dir: &Path,
        data: &ProblemData,
        documentation: &str,
    ) -> anyhow::Result<usize> {
        if data.solutions.is_empty() {
            warn!("No solutions found for this problem");
            return Ok(0);
        }

        let solutions_dir = package_dir.join("solutions");
        fs::create_dir_all(&solutions_dir)?;

        let mut written = 0;
        for (i, solution) in data.solutions.iter().enumerate() {
            let language = solution.language();
            info!(
                solution = i + 1,
                total = data.solutions.len(),
                language = language.display_name(),
                "Converting solution"
            );

            let request = build_solution_conversion_prompt(
                solution.solution_text.as_deref().unwrap_or_default(),
                language.display_name(),
                documentation,
                &data.problem.name,
            )
            .into_request();
            match self
                .ask(request, SOLUTION_MAX_TOKENS, SOLUTION_TEMPERATURE)
                .await
            {
                Ok(reply) => {
                    let path =
                        solutions_dir.join(format!("s{:02}{}", i + 1, language.extension()));
                    write_file(&path, &extract_code_block(&reply))?;
                    written += 1;
                }
                Err(e) => error!(solution = i + 1, error = %e, "Failed to convert solution"),
            }
        }
        Ok(written)
    }

    /// Writes `statements/problem.tex` and its sections; returns the section
    /// names written.
    async fn write_statement(
        &self,
        package_dir: &Path,
        description: &str,
        documentation: &str,
        name: &str,
    ) -> anyhow::Result<Vec<String>> {
        let statements_dir = package_dir.join("statements");
        let latex_dir = statements_dir.join("latex");
        fs::create_dir_all(&latex_dir)?;

        info!("Converting statement to olymp.sty LaTeX");
        let latex = self
            .ask(
                build_latex_prompt(description, documentation, name).into_request(),
                LATEX_MAX_TOKENS,
                DEFAULT_TEMPERATURE,
            )
            .await
            .context("Failed to convert to LaTeX format")?;
        write_file(&statements_dir.join("problem.tex"), &latex)?;

        info!("Dividing LaTeX into sections");
        let reply = self
            .ask(
                build_section_split_prompt(&latex).into_request(),
                LATEX_MAX_TOKENS,
                SPLIT_TEMPERATURE,
            )
            .await
            .context("Failed to split LaTeX into sections")?;
        let sections = split_sections(&reply);

        let mut written = Vec::new();
        for section in LATEX_SECTIONS {
            match sections.get(*section) {
                Some(body) => {
                    let body = strip_code_fence(body, "latex");
                    write_file(&latex_dir.join(format!("{}.tex", section)), &body)?;
                    written.push(section.to_string());
                }
                None => warn!(section, "Section missing from split"),
            }
        }
        Ok(written)
    }

    async fn ask(
        &self,
        request: GenerationRequest,
        max_tokens: u32,
        temperature: f64,
    ) -> anyhow::Result<String> {
        let request = request
            .with_max_tokens(max_tokens)
            .with_temperature(temperature);
        Ok(complete(self.llm.as_ref(), request).await?)
    }
}

/// Writes the decoded arguments to `original_tests/NNN.ext`; returns the
/// paths and the decoded texts in package order.
fn write_original_tests(
    package_dir: &Path,
    ordered: &[OrderedTest<'_>],
) -> anyhow::Result<(Vec<PathBuf>, Vec<String>)> {
    if ordered.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let dir = package_dir.join("original_tests");
    fs::create_dir_all(&dir)?;

    let mut paths = Vec::with_capacity(ordered.len());
    let mut decoded = Vec::with_capacity(ordered.len());
    for (i, test) in ordered.iter().enumerate() {
        let text = decode_args_or_raw(&test.case.args);
        let path = dir.join(format!("{:03}{}", i + 1, test.extension));
        write_file(&path, &text)?;
        paths.push(path);
        decoded.push(text);
    }
    info!(count = paths.len(), dir = %dir.display(), "Saved original test cases");
    Ok((paths, decoded))
}

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
