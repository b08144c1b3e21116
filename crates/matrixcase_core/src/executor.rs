//! Expansion orchestration: validate bindings, materialize values, enumerate, invoke, collect outcomes.
//!
//! ## Notes
//! - Execution is sequential and in enumeration order. Invocations may share fixture state, so nothing here is
//!   parallelized.
//! - Configuration failures never escape [`TestMethodExecutor::execute`]. They become a single error outcome named
//!   after the bare test method.
//! - A failing or panicking combination does not stop the remaining combinations.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::binding::ArgumentBinding;
use crate::catalog::TypeCatalog;
use crate::compat::{StrictCompatibility, TypeCompatibility};
use crate::descriptor::TestDescriptor;
use crate::enumerate::{combination_count, enumerate, Combinations};
use crate::errors::ExpansionError;
use crate::naming::DisplayNameFormatter;
use crate::outcome::{FailureDetail, FailureKind, InvocationResult, Outcome};
use crate::provider::{ProviderContext, ValueProvider, Values};
use crate::validate::{check_values, validate};
use crate::value::Value;

// ============================================================================
// Invocation capability
// ============================================================================

/// Host capability that runs the test body once with one argument tuple.
pub trait Invoker {
    fn invoke(&mut self, args: &[Value]) -> InvocationResult;
}

impl<F> Invoker for F
where
    F: FnMut(&[Value]) -> InvocationResult,
{
    fn invoke(&mut self, args: &[Value]) -> InvocationResult {
        self(args)
    }
}

// ============================================================================
// Expansion
// ============================================================================

/// Where the executor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    Validating,
    Enumerating,
    /// Running the k-th combination (1-based).
    Invoking(usize),
    Done,
    Aborted,
}

/// A validated expansion: materialized value lists in parameter order plus naming for each combination.
#[derive(Debug, Clone)]
pub struct Expansion {
    test_name: String,
    value_lists: Vec<Values>,
    total: Option<usize>,
    formatter: DisplayNameFormatter,
}

impl Expansion {
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Combination count, or `None` if it overflows `usize`.
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    pub fn value_lists(&self) -> &[Values] {
        &self.value_lists
    }

    pub fn combinations(&self) -> Combinations<'_, Values> {
        enumerate(&self.value_lists)
    }

    /// Display name and argument tuple for every combination, in enumeration order.
    pub fn cases(&self) -> impl Iterator<Item = (String, Vec<Value>)> + '_ {
        self.combinations().enumerate().map(move |(i, args)| {
            let name = self.formatter.format(&self.test_name, i + 1, &args);
            (name, args)
        })
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Drives one test method through validation, enumeration and invocation.
pub struct TestMethodExecutor<'a> {
    catalog: &'a dyn TypeCatalog,
    compatibility: &'a dyn TypeCompatibility,
    phase: ExecutionPhase,
}

impl<'a> TestMethodExecutor<'a> {
    pub fn new(catalog: &'a dyn TypeCatalog) -> Self {
        Self {
            catalog,
            compatibility: &StrictCompatibility,
            phase: ExecutionPhase::Validating,
        }
    }

    /// Replace the default [`StrictCompatibility`] rule.
    pub fn with_compatibility(mut self, compatibility: &'a dyn TypeCompatibility) -> Self {
        self.compatibility = compatibility;
        self
    }

    pub fn phase(&self) -> ExecutionPhase {
        self.phase
    }

    /// Validate `bindings` against `test` and materialize every parameter's values.
    ///
    /// ## Errors
    /// - Any [`ExpansionError`]; in that case the phase is left at the stage that failed.
    pub fn expand(&mut self, test: &TestDescriptor, bindings: &[ArgumentBinding]) -> Result<Expansion, ExpansionError> {
        self.phase = ExecutionPhase::Validating;
        let ordered = validate(test, bindings)?;

        self.phase = ExecutionPhase::Enumerating;
        let mut value_lists = Vec::with_capacity(ordered.len());
        for (binding, parameter) in ordered.iter().zip(test.parameters()) {
            let ctx = ProviderContext {
                test,
                parameter,
                catalog: self.catalog,
            };
            let values = binding
                .provider()
                .values(&ctx)
                .map_err(|source| ExpansionError::Provider {
                    parameter: parameter.name().to_string(),
                    source,
                })?;
            value_lists.push(values);
        }
        check_values(test.parameters(), &value_lists, self.compatibility)?;

        let total = combination_count(&value_lists);
        if total.is_none() {
            tracing::warn!(test = %test.name(), "combination count overflows; display names fall back to width 1");
        }

        Ok(Expansion {
            test_name: test.name().to_string(),
            value_lists,
            total,
            formatter: DisplayNameFormatter::for_total(total),
        })
    }

    /// Expand `test` and invoke it once per combination.
    ///
    /// ## Returns
    /// - One outcome per combination in enumeration order, or exactly one error outcome if expansion failed.
    #[tracing::instrument(skip_all, fields(test = %test.name(), parameters = test.parameters().len()))]
    pub fn execute(
        &mut self,
        test: &TestDescriptor,
        bindings: &[ArgumentBinding],
        invoker: &mut dyn Invoker,
    ) -> Vec<Outcome> {
        let expansion = match self.expand(test, bindings) {
            Ok(expansion) => expansion,
            Err(err) => {
                tracing::warn!(error = %err, "expansion aborted");
                self.phase = ExecutionPhase::Aborted;
                return vec![err.to_outcome(test.name())];
            }
        };

        tracing::debug!(total = ?expansion.total(), "expanding");
        self.invoke_cases(expansion.cases(), invoker)
    }

    /// Invoke the test body once per `(display name, arguments)` case, in order.
    ///
    /// ## Notes
    /// - Nothing is reserved from the combination count; outcomes grow as cases run.
    /// - A panicking invoker fails only its own case.
    pub fn invoke_cases<I>(&mut self, cases: I, invoker: &mut dyn Invoker) -> Vec<Outcome>
    where
        I: IntoIterator<Item = (String, Vec<Value>)>,
    {
        let mut outcomes = Vec::new();
        for (k, (name, args)) in cases.into_iter().enumerate() {
            self.phase = ExecutionPhase::Invoking(k + 1);
            let result = panic::catch_unwind(AssertUnwindSafe(|| invoker.invoke(&args)))
                .unwrap_or_else(|payload| {
                    InvocationResult::fail_with(FailureDetail::new(FailureKind::Panic, panic_message(&*payload)))
                });
            let outcome = result.into_outcome(name);
            tracing::debug!(case = %outcome.display_name, passed = outcome.is_passed(), "invoked");
            outcomes.push(outcome);
        }

        self.phase = ExecutionPhase::Done;
        outcomes
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "test body panicked".to_string()
    }
}
