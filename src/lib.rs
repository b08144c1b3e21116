#![forbid(unsafe_code)]
//! matrixcase: combinatorial expansion of parameterized tests
//!
//! The expansion engine lives in `matrixcase_core`. This crate is a reference host around it: it loads matrix
//! declaration files, runs factory methods and test bodies as external commands, and reports outcomes.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Test bodies**: a panic inside an invoker is caught by the engine and recorded as a failing case.

pub mod cli;

pub use matrixcase_core as engine;
