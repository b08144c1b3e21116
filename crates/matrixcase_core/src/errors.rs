//! Configuration-error taxonomy.
//!
//! Everything here is fatal to one expansion: the executor converts it into a single synthetic error outcome.
//! Test-body failures are not errors in this sense; they are ordinary failing outcomes (see [`crate::outcome`]).

use thiserror::Error;

use crate::binding::ParameterRef;
use crate::catalog::BoxError;
use crate::outcome::{FailureDetail, FailureKind, Outcome};
use crate::value::TypeTag;

/// Binding or value-set problems found before any invocation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(
        "`{test}` declares {parameters} parameter(s) but {bindings} argument binding(s) were supplied{}",
        unbound_suffix(.unbound)
    )]
    CountMismatch {
        test: String,
        parameters: usize,
        bindings: usize,
        /// Parameters that no supplied binding resolves to.
        unbound: Vec<String>,
    },

    #[error("argument binding {target} does not match any parameter of `{test}`")]
    UnresolvedBinding { test: String, target: ParameterRef },

    #[error("parameter `{parameter}` of `{test}` is bound more than once")]
    DuplicateBinding { test: String, parameter: String },

    #[error("parameter `{parameter}` of `{test}` has no argument binding")]
    MissingBinding { test: String, parameter: String },

    #[error("value provider for parameter `{parameter}` produced no values")]
    EmptyValues { parameter: String },

    #[error("{}", describe_mismatches(.0))]
    TypeMismatch(Vec<TypeMismatch>),
}

/// One value that cannot be passed to its parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    pub parameter: String,
    pub expected: TypeTag,
    /// The value as rendered in display names, e.g. `"thevalue"`.
    pub value: String,
}

fn unbound_suffix(unbound: &[String]) -> String {
    if unbound.is_empty() {
        String::new()
    } else {
        format!("; unbound: {}", unbound.join(", "))
    }
}

fn describe_mismatches(mismatches: &[TypeMismatch]) -> String {
    mismatches
        .iter()
        .map(|m| {
            format!(
                "value {} is not assignable to parameter `{}` of type {}",
                m.value, m.parameter, m.expected
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// A value provider could not produce its value list.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("literal value list must contain at least one value")]
    EmptyLiteral,

    #[error("type `{type_name}` is not known")]
    UnknownType { type_name: String },

    #[error("type `{type_name}` is not an enumeration")]
    NotAnEnumeration { type_name: String },

    #[error("factory method `{method}` could not be resolved")]
    FactoryNotFound { method: String },

    #[error("factory method `{method}` is not static")]
    FactoryNotStatic { method: String },

    #[error("factory method `{method}` must take no parameters but takes {arity}")]
    FactoryTakesParameters { method: String, arity: usize },

    #[error("factory method `{method}` returned {returned}, not a collection of values")]
    FactoryNotIterable { method: String, returned: &'static str },

    #[error("factory method `{method}` returned null")]
    FactoryReturnedNull { method: String },

    #[error("factory method `{method}` failed")]
    FactoryFailed {
        method: String,
        #[source]
        source: BoxError,
    },

    /// Raised by host-defined providers.
    #[error("{message}")]
    Custom { message: String },
}

/// Any failure that aborts an expansion.
#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot resolve values for parameter `{parameter}`")]
    Provider {
        parameter: String,
        #[source]
        source: ProviderError,
    },
}

impl ExpansionError {
    /// Classification carried by the synthetic error outcome.
    pub fn kind(&self) -> FailureKind {
        match self {
            ExpansionError::Validation(e) => match e {
                ValidationError::CountMismatch { .. } => FailureKind::CountMismatch,
                ValidationError::UnresolvedBinding { .. } => FailureKind::UnresolvedBinding,
                ValidationError::DuplicateBinding { .. } => FailureKind::DuplicateBinding,
                ValidationError::MissingBinding { .. } => FailureKind::MissingBinding,
                ValidationError::EmptyValues { .. } => FailureKind::EmptyValues,
                ValidationError::TypeMismatch(_) => FailureKind::TypeMismatch,
            },
            ExpansionError::Provider { .. } => FailureKind::ProviderResolution,
        }
    }

    /// The single error outcome that replaces an aborted expansion. It is named after the bare test method.
    pub fn to_outcome(&self, test_name: &str) -> Outcome {
        Outcome::error(test_name, FailureDetail::from_error(self.kind(), self))
    }
}
