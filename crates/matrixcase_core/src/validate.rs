//! Binding validation: completeness, uniqueness and value-type compatibility.
//!
//! ## Notes
//! - The count check runs first. Its error names the parameters no supplied binding resolves to, so a missing
//!   binding is reported by name even though it surfaces as a count mismatch.
//! - Type compatibility is a complete pre-flight pass: every candidate value of every parameter is checked and all
//!   mismatches are reported together.

use crate::binding::{ArgumentBinding, ParameterRef};
use crate::compat::{accepts, TypeCompatibility};
use crate::descriptor::{Parameter, TestDescriptor};
use crate::errors::{TypeMismatch, ValidationError};
use crate::naming::render_value;
use crate::provider::Values;

/// Resolve a binding target to a parameter ordinal.
///
/// ## Returns
/// - `Some(ordinal)` for an in-range index or a name matching exactly one parameter, otherwise `None`.
pub fn resolve_target(test: &TestDescriptor, target: &ParameterRef) -> Option<usize> {
    match target {
        ParameterRef::Index(i) => (*i < test.parameters().len()).then_some(*i),
        ParameterRef::Name(name) => test.parameter_named(name).map(Parameter::ordinal),
    }
}

/// Check that `bindings` cover every parameter of `test` exactly once.
///
/// ## Returns
/// - The bindings reordered into parameter-ordinal order (position 0 first).
///
/// ## Errors
/// - [`ValidationError::CountMismatch`] when the binding count differs from the parameter count.
/// - [`ValidationError::UnresolvedBinding`] for an out-of-range index or a name matching no single parameter.
/// - [`ValidationError::DuplicateBinding`] when two bindings resolve to the same parameter.
/// - [`ValidationError::MissingBinding`] when a parameter is claimed by no binding.
pub fn validate<'b>(
    test: &TestDescriptor,
    bindings: &'b [ArgumentBinding],
) -> Result<Vec<&'b ArgumentBinding>, ValidationError> {
    let parameters = test.parameters();

    if bindings.len() != parameters.len() {
        let claimed: Vec<usize> = bindings
            .iter()
            .filter_map(|b| resolve_target(test, b.target()))
            .collect();
        let unbound = parameters
            .iter()
            .filter(|p| !claimed.contains(&p.ordinal()))
            .map(|p| p.name().to_string())
            .collect();
        return Err(ValidationError::CountMismatch {
            test: test.name().to_string(),
            parameters: parameters.len(),
            bindings: bindings.len(),
            unbound,
        });
    }

    let mut slots: Vec<Option<&ArgumentBinding>> = vec![None; parameters.len()];
    for binding in bindings {
        let ordinal =
            resolve_target(test, binding.target()).ok_or_else(|| ValidationError::UnresolvedBinding {
                test: test.name().to_string(),
                target: binding.target().clone(),
            })?;
        if slots[ordinal].replace(binding).is_some() {
            return Err(ValidationError::DuplicateBinding {
                test: test.name().to_string(),
                parameter: parameters[ordinal].name().to_string(),
            });
        }
    }

    slots
        .into_iter()
        .zip(parameters)
        .map(|(slot, parameter)| {
            slot.ok_or_else(|| ValidationError::MissingBinding {
                test: test.name().to_string(),
                parameter: parameter.name().to_string(),
            })
        })
        .collect()
}

/// Check materialized value lists (in parameter order) before enumeration.
///
/// ## Errors
/// - [`ValidationError::EmptyValues`] for the first parameter whose provider produced no values.
/// - [`ValidationError::TypeMismatch`] listing every value not assignable to its parameter's declared type.
pub fn check_values(
    parameters: &[Parameter],
    value_lists: &[Values],
    compat: &dyn TypeCompatibility,
) -> Result<(), ValidationError> {
    if let Some((parameter, _)) = parameters.iter().zip(value_lists).find(|(_, values)| values.is_empty()) {
        return Err(ValidationError::EmptyValues {
            parameter: parameter.name().to_string(),
        });
    }

    let mismatches: Vec<TypeMismatch> = parameters
        .iter()
        .zip(value_lists)
        .flat_map(move |(parameter, values)| {
            values
                .iter()
                .filter(move |value| !accepts(compat, value, parameter.ty()))
                .map(move |value| TypeMismatch {
                    parameter: parameter.name().to_string(),
                    expected: parameter.ty().clone(),
                    value: render_value(value),
                })
        })
        .collect();

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::TypeMismatch(mismatches))
    }
}
