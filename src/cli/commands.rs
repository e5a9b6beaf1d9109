//! CLI command definitions for problem-forge.
//!
//! This module wires the three tools to the command line: Polygon problem
//! descriptions, Polygon validators and the TopCoder archive commands.

use clap::{Args, Parser};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::{
    LlmConfig, PolygonConfig, DEFAULT_POLYGON_MODEL, DEFAULT_POLYGON_URL, DEFAULT_TOPCODER_MODEL,
};
use crate::descriptions::{
    DescriptionGenerator, DescriptionWriter, DEFAULT_LANGUAGE, DEFAULT_OUTPUT_FILE,
};
use crate::llm::{ChatClient, LlmProvider};
use crate::polygon::{PolygonApi, PolygonClient};
use crate::store::TopcoderStore;
use crate::topcoder::{
    explain, find_or_report, format_description, format_problem, format_short_description,
    Converter, InterpreterRunner, DEFAULT_PYTHON,
};
use crate::validators::{ValidatorGenerator, ValidatorWriter};

/// Default directory the converted packages are written to.
const DEFAULT_PACKAGE_DIR: &str = ".";

/// LLM-assisted tooling for Polygon problems and the TopCoder archive.
#[derive(Parser)]
#[command(name = "problem-forge")]
#[command(about = "LLM-assisted tooling for Polygon problems and TopCoder archive conversion")]
#[command(version)]
#[command(
    long_about = "problem-forge generates short problem descriptions and testlib validators for Polygon contests, and inspects or converts TopCoder archive problems into ICPC packages.\n\nExample usage:\n  problem-forge describe 12345 -o descriptions.csv\n  problem-forge validators 12345 --dry-run\n  problem-forge topcoder convert --db topcoder.db CatRescue"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate three-sentence descriptions for the problems of Polygon contests.
    Describe(DescribeArgs),

    /// Generate and upload validators for Polygon problems that lack one.
    Validators(ValidatorsArgs),

    /// Inspect and convert problems from a TopCoder archive database.
    #[command(name = "topcoder", alias = "tc")]
    Topcoder(TopcoderArgs),
}

/// Chat-completion endpoint options.
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// OpenAI-compatible API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL.
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub api_base: Option<String>,
}

impl LlmArgs {
    fn resolve(&self, model: &str) -> anyhow::Result<LlmConfig> {
        Ok(LlmConfig::resolve(
            self.api_key.clone(),
            self.api_base.clone(),
            model,
        )?)
    }
}

/// Polygon API options.
#[derive(Args, Debug, Clone)]
pub struct PolygonArgs {
    /// Polygon API URL.
    #[arg(long, default_value = DEFAULT_POLYGON_URL)]
    pub polygon_url: String,

    /// Polygon API key.
    #[arg(long, env = "POLYGON_API_KEY", hide_env_values = true)]
    pub polygon_key: Option<String>,

    /// Polygon API secret.
    #[arg(long, env = "POLYGON_API_SECRET", hide_env_values = true)]
    pub polygon_secret: Option<String>,
}

impl PolygonArgs {
    fn resolve(&self) -> anyhow::Result<PolygonConfig> {
        Ok(PolygonConfig::resolve(
            self.polygon_url.as_str(),
            self.polygon_key.clone(),
            self.polygon_secret.clone(),
        )?)
    }
}

/// Arguments for `problem-forge describe`.
#[derive(Parser, Debug)]
pub struct DescribeArgs {
    /// Contest ID(s) to process.
    #[arg(required = true)]
    pub contest_ids: Vec<i64>,

    /// Output CSV file.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Language of the generated descriptions.
    #[arg(short = 'L', long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Model used for generation.
    #[arg(short = 'm', long, default_value = DEFAULT_POLYGON_MODEL)]
    pub model: String,

    #[command(flatten)]
    pub polygon: PolygonArgs,

    #[command(flatten)]
    pub llm: LlmArgs,
}

/// Arguments for `problem-forge validators`.
#[derive(Parser, Debug)]
pub struct ValidatorsArgs {
    /// Contest ID to process.
    pub contest_id: i64,

    /// List the problems without a validator and stop.
    #[arg(long)]
    pub dry_run: bool,

    /// Model used for generation.
    #[arg(short = 'm', long, default_value = DEFAULT_POLYGON_MODEL)]
    pub model: String,

    #[command(flatten)]
    pub polygon: PolygonArgs,

    #[command(flatten)]
    pub llm: LlmArgs,
}

/// TopCoder entrypoint arguments.
#[derive(Parser, Debug)]
pub struct TopcoderArgs {
    /// TopCoder subcommand to run.
    #[command(subcommand)]
    pub command: TopcoderSubcommand,
}

/// TopCoder subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum TopcoderSubcommand {
    /// Print the statement extracted from the problem XML.
    Description(LookupArgs),

    /// Print everything stored about a problem.
    Problem(LookupArgs),

    /// Print the statement with a formal LLM explanation.
    #[command(alias = "short_description")]
    ShortDescription(ExplainArgs),

    /// Convert a problem into an ICPC package.
    Convert(ConvertArgs),
}

/// Store and problem selection.
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Path to the SQLite database.
    #[arg(long)]
    pub db: PathBuf,

    /// Problem name (case-insensitive).
    pub problem_name: String,
}

/// Arguments for `problem-forge topcoder short-description`.
#[derive(Parser, Debug)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Model used for generation.
    #[arg(short = 'm', long, default_value = DEFAULT_TOPCODER_MODEL)]
    pub model: String,

    #[command(flatten)]
    pub llm: LlmArgs,
}

/// Arguments for `problem-forge topcoder convert`.
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Directory the package directory is created in.
    #[arg(long, default_value = DEFAULT_PACKAGE_DIR)]
    pub output_dir: PathBuf,

    /// Interpreter used to run the generated conversion script.
    #[arg(long, default_value = DEFAULT_PYTHON)]
    pub python: String,

    /// Model used for generation.
    #[arg(short = 'm', long, default_value = DEFAULT_TOPCODER_MODEL)]
    pub model: String,

    #[command(flatten)]
    pub llm: LlmArgs,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
///
/// This is the main entry point for the problem-forge CLI.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Describe(args) => run_describe_command(args).await,
        Commands::Validators(args) => run_validators_command(args).await,
        Commands::Topcoder(args) => run_topcoder_command(args).await,
    }
}

fn build_llm_client(config: &LlmConfig) -> anyhow::Result<Arc<dyn LlmProvider>> {
    info!(model = %config.model, api_base = %config.api_base, "Using chat-completion endpoint");
    Ok(Arc::new(ChatClient::new(config)?))
}

fn build_polygon_client(args: &PolygonArgs) -> anyhow::Result<Arc<dyn PolygonApi>> {
    let config = args.resolve()?;
    let client = PolygonClient::new(&config)?;
    info!(api_url = %client.api_url(), "Using Polygon API");
    Ok(Arc::new(client))
}

// ============================================================================
// Polygon Commands
// ============================================================================

async fn run_describe_command(args: DescribeArgs) -> anyhow::Result<()> {
    let polygon = build_polygon_client(&args.polygon)?;
    let llm = build_llm_client(&args.llm.resolve(&args.model)?)?;

    let writer = DescriptionWriter::new(polygon, DescriptionGenerator::new(llm, args.language));
    let written = writer
        .process_contests(&args.contest_ids, &args.output)
        .await?;

    if written > 0 {
        println!(
            "Wrote {} descriptions to {}",
            written,
            args.output.display()
        );
    }
    Ok(())
}

async fn run_validators_command(args: ValidatorsArgs) -> anyhow::Result<()> {
    let polygon = build_polygon_client(&args.polygon)?;
    let llm = build_llm_client(&args.llm.resolve(&args.model)?)?;

    let writer = ValidatorWriter::new(polygon, ValidatorGenerator::new(llm));
    let report = writer.process_contest(args.contest_id, args.dry_run).await?;

    if args.dry_run {
        println!("Problems without validators ({}):", report.missing.len());
        for problem in &report.missing {
            println!("  - {} (ID: {})", problem.name, problem.id);
        }
    } else {
        println!(
            "Successfully added validators to {}/{} problems",
            report.succeeded.len(),
            report.attempted()
        );
    }
    Ok(())
}

// ============================================================================
// TopCoder Commands
// ============================================================================

async fn run_topcoder_command(args: TopcoderArgs) -> anyhow::Result<()> {
    match args.command {
        TopcoderSubcommand::Description(args) => run_tc_description_command(args).await,
        TopcoderSubcommand::Problem(args) => run_tc_problem_command(args).await,
        TopcoderSubcommand::ShortDescription(args) => run_tc_short_description_command(args).await,
        TopcoderSubcommand::Convert(args) => run_tc_convert_command(args).await,
    }
}

async fn run_tc_description_command(args: LookupArgs) -> anyhow::Result<()> {
    let store = TopcoderStore::open(&args.db).await?;
    println!("Searching for problem: '{}'...", args.problem_name);

    let result = find_or_report(&store, &args.problem_name).await;
    store.close().await;

    if let Some(data) = result? {
        println!("{}", format_description(&data));
    }
    Ok(())
}

async fn run_tc_problem_command(args: LookupArgs) -> anyhow::Result<()> {
    let store = TopcoderStore::open(&args.db).await?;
    println!("Searching for problem: '{}'...", args.problem_name);

    let result = find_or_report(&store, &args.problem_name).await;
    store.close().await;

    if let Some(data) = result? {
        println!("{}", format_problem(&data));
    }
    Ok(())
}

async fn run_tc_short_description_command(args: ExplainArgs) -> anyhow::Result<()> {
    let store = TopcoderStore::open(&args.lookup.db).await?;
    let config = args.llm.resolve(&args.model)?;
    println!("Searching for problem: '{}'...", args.lookup.problem_name);

    let result = find_or_report(&store, &args.lookup.problem_name).await;
    store.close().await;
    let Some(data) = result? else {
        return Ok(());
    };

    let Some(statement) = data.statement.as_deref() else {
        println!("No description found for problem '{}'", args.lookup.problem_name);
        return Ok(());
    };

    let llm = build_llm_client(&config)?;
    info!(problem = %data.problem.name, "Requesting formal explanation");
    let explanation = explain(llm.as_ref(), &data.problem.name, statement).await?;
    println!("{}", format_short_description(&data, statement, &explanation));
    Ok(())
}

async fn run_tc_convert_command(args: ConvertArgs) -> anyhow::Result<()> {
    let store = TopcoderStore::open(&args.lookup.db).await?;
    let config = args.llm.resolve(&args.model)?;
    println!(
        "Converting problem: '{}' from TopCoder to ICPC format...",
        args.lookup.problem_name
    );

    let result = find_or_report(&store, &args.lookup.problem_name).await;
    store.close().await;
    let Some(data) = result? else {
        return Ok(());
    };

    println!("Found problem: {}", data.problem.name);
    println!("Problem ID: {}", data.problem.problem_id);

    let llm = build_llm_client(&config)?;
    let runner = InterpreterRunner::new(args.python);
    info!(interpreter = %runner.interpreter(), "Running conversion scripts");
    let runner = Arc::new(runner);
    let converter = Converter::new(llm, runner, args.output_dir);
    let summary = converter.convert(&data).await?;

    println!("{}", summary.report());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        // Verify CLI definition is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_describe_command_defaults() {
        let args = vec!["problem-forge", "describe", "101", "102"];
        let cli = Cli::try_parse_from(args).expect("should parse");

        assert_eq!(cli.log_level, "info");
        match cli.command {
            Commands::Describe(args) => {
                assert_eq!(args.contest_ids, vec![101, 102]);
                assert_eq!(args.output, PathBuf::from(DEFAULT_OUTPUT_FILE));
                assert_eq!(args.language, DEFAULT_LANGUAGE);
                assert_eq!(args.model, DEFAULT_POLYGON_MODEL);
                assert_eq!(args.polygon.polygon_url, DEFAULT_POLYGON_URL);
            }
            _ => panic!("Expected Describe command"),
        }
    }

    #[test]
    fn test_describe_requires_contest() {
        assert!(Cli::try_parse_from(["problem-forge", "describe"]).is_err());
    }

    #[test]
    fn test_describe_command_with_options() {
        let args = vec![
            "problem-forge",
            "describe",
            "7",
            "-o",
            "out.csv",
            "-L",
            "Spanish",
            "--polygon-key",
            "k",
            "--polygon-secret",
            "s",
            "--api-key",
            "sk",
            "--api-base",
            "http://localhost:4000/v1",
            "--log-level",
            "debug",
        ];
        let cli = Cli::try_parse_from(args).expect("should parse");

        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Describe(args) => {
                assert_eq!(args.output, PathBuf::from("out.csv"));
                assert_eq!(args.language, "Spanish");
                assert_eq!(args.polygon.polygon_key.as_deref(), Some("k"));
                assert_eq!(args.polygon.polygon_secret.as_deref(), Some("s"));

                let config = args.llm.resolve(&args.model).unwrap();
                assert_eq!(config.api_key, "sk");
                assert_eq!(config.api_base, "http://localhost:4000/v1");
                assert_eq!(config.model, DEFAULT_POLYGON_MODEL);
            }
            _ => panic!("Expected Describe command"),
        }
    }

    #[test]
    fn test_validators_command() {
        let cli = Cli::try_parse_from(["problem-forge", "validators", "55", "--dry-run"])
            .expect("should parse");
        match cli.command {
            Commands::Validators(args) => {
                assert_eq!(args.contest_id, 55);
                assert!(args.dry_run);
            }
            _ => panic!("Expected Validators command"),
        }
    }

    #[test]
    fn test_topcoder_subcommands() {
        let cli = Cli::try_parse_from([
            "problem-forge",
            "topcoder",
            "problem",
            "--db",
            "tc.db",
            "CatRescue",
        ])
        .expect("should parse");
        match cli.command {
            Commands::Topcoder(TopcoderArgs {
                command: TopcoderSubcommand::Problem(args),
            }) => {
                assert_eq!(args.db, PathBuf::from("tc.db"));
                assert_eq!(args.problem_name, "CatRescue");
            }
            _ => panic!("Expected topcoder problem command"),
        }

        let cli = Cli::try_parse_from([
            "problem-forge",
            "tc",
            "convert",
            "--db",
            "tc.db",
            "Cat Rescue",
            "--output-dir",
            "packages",
            "--python",
            "python3.12",
        ])
        .expect("should parse");
        match cli.command {
            Commands::Topcoder(TopcoderArgs {
                command: TopcoderSubcommand::Convert(args),
            }) => {
                assert_eq!(args.lookup.problem_name, "Cat Rescue");
                assert_eq!(args.output_dir, PathBuf::from("packages"));
                assert_eq!(args.python, "python3.12");
                assert_eq!(args.model, DEFAULT_TOPCODER_MODEL);
            }
            _ => panic!("Expected topcoder convert command"),
        }
    }

    #[test]
    fn test_short_description_spellings() {
        for name in ["short-description", "short_description"] {
            let cli = Cli::try_parse_from(["problem-forge", "topcoder", name, "--db", "tc.db", "Widgets"])
                .expect("should parse");
            match cli.command {
                Commands::Topcoder(TopcoderArgs {
                    command: TopcoderSubcommand::ShortDescription(args),
                }) => {
                    assert_eq!(args.lookup.problem_name, "Widgets");
                    assert_eq!(args.model, DEFAULT_TOPCODER_MODEL);
                }
                _ => panic!("Expected topcoder short-description command"),
            }
        }
    }

    #[test]
    fn test_topcoder_requires_db() {
        assert!(Cli::try_parse_from(["problem-forge", "topcoder", "description", "X"]).is_err());
    }

    #[tokio::test]
    async fn test_missing_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = LookupArgs {
            db: dir.path().join("missing.db"),
            problem_name: "X".to_string(),
        };
        assert!(run_tc_description_command(args).await.is_err());
    }
}
