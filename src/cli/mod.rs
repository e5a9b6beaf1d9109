//! Command-line interface for problem-forge.
//!
//! Provides the Polygon description and validator commands and the TopCoder
//! archive commands.

mod commands;

pub use commands::{parse_cli, run, run_with_cli, Cli};
