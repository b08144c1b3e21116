//! CLI module for matrixcase
//!
//! This module provides the command-line interface for expanding and running matrix declaration files.
//!
//! ## Commands
//!
//! - `run <file>` - Expand the declared test and run its command once per case
//! - `list <file>` - Validate and print every case name without running anything
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//! - `declaration` - Declaration file format and loader
//! - `interfaces` - Process I/O boundary (command runner, command-backed invoker)
//! - `reporter` - Console and JSON reporters
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod declaration;
pub mod interfaces;
pub mod reporter;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Expand parameterized tests into every combination of their parameter values
#[derive(Parser, Debug)]
#[command(name = "matrixcase")]
#[command(version = VERSION)]
#[command(about = "Expand parameterized tests into every combination of their parameter values", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Report format for `run` and `list`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Expand the declared test and run its command once per case
    Run {
        /// Matrix declaration file (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Verbose output (one line per case)
        #[arg(short, long)]
        verbose: bool,
        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
        format: OutputFormat,
    },

    /// Validate the declaration and print every case name without running anything
    List {
        /// Matrix declaration file (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Maximum number of case names to print
        #[arg(long, default_value_t = commands::DEFAULT_LIST_LIMIT)]
        limit: usize,
        /// Listing format
        #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
        format: OutputFormat,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Run { file, verbose, format } => commands::run_matrix(&file.to_string_lossy(), verbose, format),
        Command::List { file, limit, format } => commands::list_matrix(&file.to_string_lossy(), limit, format),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::try_parse_from(["matrixcase", "run", "login.json", "-v"]).unwrap();
        if let Command::Run { file, verbose, format } = cli.command {
            assert_eq!(file, PathBuf::from("login.json"));
            assert!(verbose);
            assert_eq!(format, OutputFormat::Console);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_list_json() {
        let cli = Cli::try_parse_from(["matrixcase", "list", "login.json", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                format: OutputFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_parse_list_limit() {
        let cli = Cli::try_parse_from(["matrixcase", "list", "login.json", "--limit", "5"]).unwrap();
        assert!(matches!(cli.command, Command::List { limit: 5, .. }));

        let cli = Cli::try_parse_from(["matrixcase", "list", "login.json"]).unwrap();
        assert!(matches!(cli.command, Command::List { limit: commands::DEFAULT_LIST_LIMIT, .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["matrixcase", "run", "login.json", "--format", "tap"]).is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["matrixcase"]).is_err());
    }
}
