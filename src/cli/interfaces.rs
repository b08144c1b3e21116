//! Process I/O boundary interfaces
//!
//! Factory methods and test bodies declared in a matrix file are external commands. This module puts the process
//! invocation behind the `CommandRunner` trait so declaration loading and expansion can be exercised without
//! spawning anything.

use std::io;
use std::process::Command;

use matrixcase_core::{FailureDetail, FailureKind, InvocationResult, Invoker, Parameter, Value};
use thiserror::Error;

/// Errors that occur while running an external command
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("command is empty")]
    EmptyCommand,

    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}: {detail}")]
    Exit {
        program: String,
        status: String,
        detail: String,
    },
}

/// Captured result of one finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Trimmed stderr, falling back to trimmed stdout, falling back to the exit status.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("command exited with {}", self.status())
    }

    fn status(&self) -> String {
        match self.code {
            Some(code) => format!("status {}", code),
            None => "no status (terminated by signal)".to_string(),
        }
    }

    /// Turn a non-zero exit into [`RunnerError::Exit`].
    pub fn into_success(self, program: &str) -> Result<CommandOutput, RunnerError> {
        if self.success {
            Ok(self)
        } else {
            Err(RunnerError::Exit {
                program: program.to_string(),
                status: self.status(),
                detail: self.failure_message(),
            })
        }
    }
}

// ============================================================================
// Command Runner Interface
// ============================================================================

/// Run an external command to completion and capture its output.
///
/// `argv[0]` is the program; `env` is added to the inherited environment.
pub trait CommandRunner {
    fn run(&self, argv: &[String], env: &[(String, String)]) -> Result<CommandOutput, RunnerError>;
}

/// `std::process::Command` execution with output capture (current behavior).
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, argv: &[String], env: &[(String, String)]) -> Result<CommandOutput, RunnerError> {
        let (program, args) = argv.split_first().ok_or(RunnerError::EmptyCommand)?;
        let output = Command::new(program)
            .args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .map_err(|source| RunnerError::Spawn {
                program: program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

// ============================================================================
// Command-backed test body
// ============================================================================

/// Runs the declared test command once per combination.
///
/// ## Notes
/// - Each argument is appended to the command line in its `Display` form and exported as `MATRIXCASE_ARG_<i>` and
///   `MATRIXCASE_ARG_<NAME>`. `MATRIXCASE_SEQ` carries the 1-based combination number.
/// - Exit status 0 passes.
pub struct CommandInvoker<'a> {
    runner: &'a dyn CommandRunner,
    command: &'a [String],
    parameter_names: Vec<String>,
    sequence: usize,
}

impl<'a> CommandInvoker<'a> {
    pub fn new(runner: &'a dyn CommandRunner, command: &'a [String], parameters: &[Parameter]) -> Self {
        Self {
            runner,
            command,
            parameter_names: parameters.iter().map(|p| env_key(p.name())).collect(),
            sequence: 0,
        }
    }

    fn environment(&self, args: &[Value]) -> Vec<(String, String)> {
        let mut env = vec![("MATRIXCASE_SEQ".to_string(), self.sequence.to_string())];
        for (i, arg) in args.iter().enumerate() {
            let text = arg.to_string();
            if let Some(name) = self.parameter_names.get(i) {
                env.push((format!("MATRIXCASE_ARG_{}", name), text.clone()));
            }
            env.push((format!("MATRIXCASE_ARG_{}", i), text));
        }
        env
    }
}

impl Invoker for CommandInvoker<'_> {
    fn invoke(&mut self, args: &[Value]) -> InvocationResult {
        self.sequence += 1;
        let mut argv = self.command.to_vec();
        argv.extend(args.iter().map(ToString::to_string));
        let env = self.environment(args);

        match self.runner.run(&argv, &env) {
            Ok(output) if output.success => InvocationResult::pass(),
            Ok(output) => InvocationResult::fail(output.failure_message()),
            Err(err) => InvocationResult::fail_with(FailureDetail::from_error(FailureKind::TestFailure, &err)),
        }
    }
}

/// Upper-case a parameter name and replace anything outside `[A-Z0-9_]` with `_`.
fn env_key(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}
