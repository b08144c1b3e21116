//! Outcome reporting
//!
//! The `run` command hands every outcome to a `Reporter`. Implement the trait to add output formats; the console
//! and JSON reporters cover the CLI's `--format` choices.

use std::io::{self, Write};
use std::time::Duration;

use matrixcase_core::{Outcome, OutcomeStatus};
use serde::Serialize;

// ============================================================================
// Reporter Trait
// ============================================================================

/// Trait for reporting the outcomes of one expanded test method.
pub trait Reporter {
    /// Called once before any outcome, with the number of outcomes that follow.
    fn on_expansion_start(&mut self, test: &str, total: usize) -> io::Result<()>;

    /// Called for each outcome in enumeration order.
    fn on_outcome(&mut self, outcome: &Outcome) -> io::Result<()>;

    /// Called after the last outcome.
    fn on_run_complete(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Summary of one expansion run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub test: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl RunSummary {
    pub fn from_outcomes(test: &str, outcomes: &[Outcome], duration: Duration) -> Self {
        let count = |status: OutcomeStatus| outcomes.iter().filter(|o| o.status == status).count();
        Self {
            test: test.to_string(),
            total: outcomes.len(),
            passed: count(OutcomeStatus::Passed),
            failed: count(OutcomeStatus::Failed),
            errors: count(OutcomeStatus::Error),
            duration,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

fn serialize_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Feed `outcomes` through `reporter` from start to summary.
pub fn report_all(reporter: &mut dyn Reporter, summary: &RunSummary, outcomes: &[Outcome]) -> io::Result<()> {
    reporter.on_expansion_start(&summary.test, outcomes.len())?;
    for outcome in outcomes {
        reporter.on_outcome(outcome)?;
    }
    reporter.on_run_complete(summary)
}

// ============================================================================
// Console Reporter
// ============================================================================

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";
const BOLD: &str = "1";
const BOLD_RED: &str = "1;31";
const BOLD_GREEN: &str = "1;32";

/// pytest-style console reporter
pub struct ConsoleReporter<W: Write> {
    out: W,
    verbose: bool,
    use_colors: bool,
    failures: Vec<Outcome>,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            use_colors: true,
            failures: Vec::new(),
        }
    }

    /// Disable ANSI colors (for piping or snapshots).
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_expansion_start(&mut self, test: &str, total: usize) -> io::Result<()> {
        let banner = self.paint(
            BOLD,
            &format!("=================== {}: {} case(s) ===================", test, total),
        );
        writeln!(self.out, "{}", banner)
    }

    fn on_outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        let (long, short, color) = match outcome.status {
            OutcomeStatus::Passed => ("PASSED", ".", GREEN),
            OutcomeStatus::Failed => ("FAILED", "F", RED),
            OutcomeStatus::Error => ("ERROR", "E", YELLOW),
        };
        if self.verbose {
            let status = self.paint(color, long);
            writeln!(self.out, "{} {}", outcome.display_name, status)?;
        } else {
            let status = self.paint(color, short);
            write!(self.out, "{}", status)?;
        }
        if !outcome.is_passed() {
            self.failures.push(outcome.clone());
        }
        Ok(())
    }

    fn on_run_complete(&mut self, summary: &RunSummary) -> io::Result<()> {
        if !self.verbose {
            writeln!(self.out)?;
        }

        if !self.failures.is_empty() {
            let header = self.paint(BOLD_RED, "=================== FAILURES ===================");
            writeln!(self.out, "{}", header)?;
            for outcome in &self.failures {
                let title = self.paint(BOLD, &format!("___________ {} ___________", outcome.display_name));
                writeln!(self.out, "{}", title)?;
                if let Some(failure) = &outcome.failure {
                    writeln!(self.out, "{}", failure)?;
                }
            }
        }

        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(self.paint(GREEN, &format!("{} passed", summary.passed)));
        }
        if summary.failed > 0 {
            parts.push(self.paint(RED, &format!("{} failed", summary.failed)));
        }
        if summary.errors > 0 {
            let noun = if summary.errors == 1 { "error" } else { "errors" };
            parts.push(self.paint(YELLOW, &format!("{} {}", summary.errors, noun)));
        }
        if parts.is_empty() {
            parts.push("no cases".to_string());
        }

        let color = if summary.all_passed() { BOLD_GREEN } else { BOLD_RED };
        let line = format!(
            "====== {} in {:.2}s ======",
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
        let line = self.paint(color, &line);
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }
}

// ============================================================================
// JSON Reporter
// ============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a RunSummary,
    outcomes: &'a [Outcome],
}

/// Collects outcomes and writes one JSON document when the run completes.
pub struct JsonReporter<W: Write> {
    out: W,
    outcomes: Vec<Outcome>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            outcomes: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_expansion_start(&mut self, _test: &str, total: usize) -> io::Result<()> {
        self.outcomes.reserve(total);
        Ok(())
    }

    fn on_outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }

    fn on_run_complete(&mut self, summary: &RunSummary) -> io::Result<()> {
        let report = JsonReport {
            summary,
            outcomes: &self.outcomes,
        };
        serde_json::to_writer_pretty(&mut self.out, &report)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use matrixcase_core::{FailureDetail, FailureKind};

    fn sample() -> Vec<Outcome> {
        vec![
            Outcome::passed("#1: login(\"ann\")"),
            Outcome::failed(
                "#2: login(\"bob\")",
                FailureDetail::new(FailureKind::TestFailure, "wrong password"),
            ),
        ]
    }

    fn console(verbose: bool) -> String {
        let outcomes = sample();
        let summary = RunSummary::from_outcomes("login", &outcomes, Duration::ZERO);
        let mut reporter = ConsoleReporter::new(Vec::new(), verbose).without_colors();
        report_all(&mut reporter, &summary, &outcomes).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let mut outcomes = sample();
        outcomes.push(Outcome::error("login", FailureDetail::new(FailureKind::MissingBinding, "x")));
        let summary = RunSummary::from_outcomes("login", &outcomes, Duration::ZERO);
        assert_eq!((summary.passed, summary.failed, summary.errors), (1, 1, 1));
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_console_verbose_report() {
        insta::assert_snapshot!(console(true), @r#"
        =================== login: 2 case(s) ===================
        #1: login("ann") PASSED
        #2: login("bob") FAILED
        =================== FAILURES ===================
        ___________ #2: login("bob") ___________
        TestFailure: wrong password
        ====== 1 passed, 1 failed in 0.00s ======
        "#);
    }

    #[test]
    fn test_console_compact_report() {
        insta::assert_snapshot!(console(false), @r#"
        =================== login: 2 case(s) ===================
        .F
        =================== FAILURES ===================
        ___________ #2: login("bob") ___________
        TestFailure: wrong password
        ====== 1 passed, 1 failed in 0.00s ======
        "#);
    }

    #[test]
    fn test_json_report() {
        let outcomes = sample();
        let summary = RunSummary::from_outcomes("login", &outcomes, Duration::ZERO);
        let mut reporter = JsonReporter::new(Vec::new());
        report_all(&mut reporter, &summary, &outcomes).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();

        assert_eq!(json["summary"]["passed"], 1);
        assert_eq!(json["summary"]["duration_secs"], 0.0);
        assert_eq!(json["outcomes"][1]["status"], "failed");
        assert_eq!(json["outcomes"][1]["failure"]["kind"], "test_failure");
        assert!(json["outcomes"][0].get("failure").is_none());
    }
}
