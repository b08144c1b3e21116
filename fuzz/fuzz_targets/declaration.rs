#![no_main]

use std::rc::Rc;

use libfuzzer_sys::fuzz_target;
use matrixcase::cli::declaration::load;
use matrixcase::engine::TestMethodExecutor;
use matrixcase::cli::interfaces::{CommandOutput, CommandRunner, RunnerError};

/// Factories always print an empty list; fuzzing never spawns processes.
struct NoProcess;

impl CommandRunner for NoProcess {
    fn run(&self, _argv: &[String], _env: &[(String, String)]) -> Result<CommandOutput, RunnerError> {
        Ok(CommandOutput {
            success: true,
            code: Some(0),
            stdout: "[]".to_string(),
            stderr: String::new(),
        })
    }
}

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Fuzz the loader
        if let Ok(declaration) = load(s, "fuzz.json", Rc::new(NoProcess)) {
            // If loading succeeds, fuzz validation and naming; cap the cases named per input
            let mut executor = TestMethodExecutor::new(&declaration.catalog);
            if let Ok(expansion) = executor.expand(&declaration.test, &declaration.bindings) {
                let _ = expansion.cases().take(1024).count();
            }
        }
    }
});
