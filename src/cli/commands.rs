//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;
use std::time::Instant;

use matrixcase_core::{Outcome, TestMethodExecutor};
use serde::Serialize;

use super::declaration::{self, Declaration};
use super::interfaces::{CommandInvoker, CommandRunner, ProcessRunner};
use super::reporter::{report_all, ConsoleReporter, JsonReporter, Reporter, RunSummary};
use super::{CliError, CliResult, ExitCode, OutputFormat};

/// Maximum declaration file size (16 MB)
///
/// Files larger than this are rejected before they are read.
const MAX_SOURCE_SIZE: u64 = 16 * 1024 * 1024;

/// Read source file contents.
///
/// ## Errors
///
/// Returns an error if:
/// - The file cannot be read (I/O error)
/// - The file exceeds `MAX_SOURCE_SIZE` (16 MB)
pub fn read_source(file_path: &str) -> CliResult<String> {
    // Check file size before reading
    let metadata =
        fs::metadata(file_path).map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", file_path, e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Declaration file '{}' is too large ({} bytes, max {} bytes)",
            file_path,
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(file_path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file_path, e)))
}

/// Read and load a declaration file, rendering load errors through miette.
pub fn load_declaration(file_path: &str, runner: Rc<dyn CommandRunner>) -> CliResult<Declaration> {
    let source = read_source(file_path)?;
    declaration::load(&source, file_path, runner)
        .map_err(|e| CliError::failure(format!("{:?}", miette::Report::new(e))))
}

// ============================================================================
// run
// ============================================================================

/// Outcomes of one expansion plus their summary.
#[derive(Debug, Clone)]
pub struct MatrixRun {
    pub outcomes: Vec<Outcome>,
    pub summary: RunSummary,
}

/// Expand a loaded declaration and run its command once per combination.
pub fn execute_declaration(declaration: &Declaration, runner: &dyn CommandRunner) -> MatrixRun {
    let started = Instant::now();
    let mut invoker = CommandInvoker::new(runner, &declaration.command, declaration.test.parameters());
    let outcomes =
        TestMethodExecutor::new(&declaration.catalog).execute(&declaration.test, &declaration.bindings, &mut invoker);
    let summary = RunSummary::from_outcomes(declaration.test.name(), &outcomes, started.elapsed());
    MatrixRun { outcomes, summary }
}

/// `matrixcase run <FILE>`
///
/// ## Returns
/// - `ExitCode::SUCCESS` when every outcome passed, otherwise `ExitCode::FAILURE`.
pub fn run_matrix(file_path: &str, verbose: bool, format: OutputFormat) -> CliResult<ExitCode> {
    let declaration = load_declaration(file_path, Rc::new(ProcessRunner))?;
    if declaration.command.is_empty() {
        return Err(CliError::failure(format!(
            "Declaration '{}' has no `command` to run for each case",
            file_path
        )));
    }

    let run = execute_declaration(&declaration, &ProcessRunner);

    let stdout = io::stdout();
    let colors = stdout.is_terminal();
    let mut reporter: Box<dyn Reporter> = match format {
        OutputFormat::Console => {
            let console = ConsoleReporter::new(stdout.lock(), verbose);
            Box::new(if colors { console } else { console.without_colors() })
        }
        OutputFormat::Json => Box::new(JsonReporter::new(stdout.lock())),
    };
    report_all(reporter.as_mut(), &run.summary, &run.outcomes)
        .map_err(|e| CliError::failure(format!("Error writing report: {}", e)))?;

    Ok(if run.summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ============================================================================
// list
// ============================================================================

/// Default cap on the number of names `list` prints.
pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// The first names of an expansion plus its full combination count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseList {
    /// `None` when the count overflows `usize`.
    pub total: Option<usize>,
    pub names: Vec<String>,
}

impl CaseList {
    /// Whether cases exist beyond the listed names.
    pub fn is_truncated(&self) -> bool {
        self.total.is_none_or(|total| total > self.names.len())
    }
}

/// Display names of at most `limit` cases, or the single error outcome of an aborted expansion.
pub fn list_cases(declaration: &Declaration, limit: usize) -> Result<CaseList, Outcome> {
    let mut executor = TestMethodExecutor::new(&declaration.catalog);
    executor
        .expand(&declaration.test, &declaration.bindings)
        .map(|expansion| CaseList {
            total: expansion.total(),
            names: expansion.cases().take(limit).map(|(name, _)| name).collect(),
        })
        .map_err(|err| err.to_outcome(declaration.test.name()))
}

#[derive(Serialize)]
struct CaseListing<'a> {
    test: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cases: Option<&'a [String]>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a Outcome>,
}

/// Write a `list` result in the requested format.
pub fn write_listing(
    out: &mut dyn Write,
    test: &str,
    listing: &Result<CaseList, Outcome>,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Console => match listing {
            Ok(list) => {
                match list.total {
                    Some(total) => writeln!(out, "{}: {} case(s)", test, total)?,
                    None => writeln!(out, "{}: more than {} case(s)", test, usize::MAX)?,
                }
                for case in &list.names {
                    writeln!(out, "  {}", case)?;
                }
                if list.is_truncated() {
                    writeln!(out, "  ... (first {} shown)", list.names.len())?;
                }
                Ok(())
            }
            Err(outcome) => {
                writeln!(out, "{} ERROR", outcome.display_name)?;
                if let Some(failure) = &outcome.failure {
                    writeln!(out, "{}", failure)?;
                }
                Ok(())
            }
        },
        OutputFormat::Json => {
            let list = listing.as_ref().ok();
            let doc = CaseListing {
                test,
                total: list.and_then(|l| l.total),
                cases: list.map(|l| l.names.as_slice()),
                truncated: list.is_some_and(CaseList::is_truncated),
                error: listing.as_ref().err(),
            };
            serde_json::to_writer_pretty(&mut *out, &doc)?;
            writeln!(out)
        }
    }
}

/// `matrixcase list <FILE>`: validate and name up to `limit` cases without invoking anything.
pub fn list_matrix(file_path: &str, limit: usize, format: OutputFormat) -> CliResult<ExitCode> {
    let declaration = load_declaration(file_path, Rc::new(ProcessRunner))?;
    let listing = list_cases(&declaration, limit);

    let mut stdout = io::stdout().lock();
    write_listing(&mut stdout, declaration.test.name(), &listing, format)
        .map_err(|e| CliError::failure(format!("Error writing listing: {}", e)))?;

    Ok(if listing.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source("definitely/not/here.json").unwrap_err();
        assert!(err.message.starts_with("Cannot access file"));
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_listing_console_and_json() {
        let listing: Result<CaseList, Outcome> = Ok(CaseList {
            total: Some(2),
            names: vec!["#1: t(1)".into(), "#2: t(2)".into()],
        });

        let mut console = Vec::new();
        write_listing(&mut console, "t", &listing, OutputFormat::Console).unwrap();
        insta::assert_snapshot!(String::from_utf8(console).unwrap(), @r"
        t: 2 case(s)
          #1: t(1)
          #2: t(2)
        ");

        let mut json = Vec::new();
        write_listing(&mut json, "t", &listing, OutputFormat::Json).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(doc["cases"][1], "#2: t(2)");
        assert_eq!(doc["total"], 2);
        assert!(doc.get("error").is_none());
        assert!(doc.get("truncated").is_none());
    }

    #[test]
    fn test_listing_marks_truncation() {
        let listing: Result<CaseList, Outcome> = Ok(CaseList {
            total: None,
            names: vec!["#1: t(0)".into()],
        });

        let mut console = Vec::new();
        write_listing(&mut console, "t", &listing, OutputFormat::Console).unwrap();
        insta::assert_snapshot!(String::from_utf8(console).unwrap(), @r"
        t: more than 18446744073709551615 case(s)
          #1: t(0)
          ... (first 1 shown)
        ");

        let mut json = Vec::new();
        write_listing(&mut json, "t", &listing, OutputFormat::Json).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert!(doc.get("total").is_none());
        assert_eq!(doc["truncated"], true);
    }
}
