//! Expand one parameterized test method into the Cartesian product of its parameters' candidate values.
//!
//! Each parameter is bound to a value provider. The engine validates the bindings, materializes every provider's
//! values, enumerates combinations in a stable order (last parameter varies fastest), names each combination
//! deterministically and invokes the test body once per combination through a host-supplied [`Invoker`].
//!
//! ## Notes
//!
//! - This is a pure engine crate: **no IO**, no global state and no knowledge of how a test body actually runs.
//! - Configuration failures (bad bindings, unresolvable providers, type mismatches) are normalized into a single
//!   error [`Outcome`], so a host always receives a list.

#![forbid(unsafe_code)]

pub mod binding;
pub mod catalog;
pub mod compat;
pub mod descriptor;
pub mod enumerate;
pub mod errors;
pub mod executor;
pub mod naming;
pub mod outcome;
pub mod provider;
pub mod validate;
pub mod value;

pub use binding::{ArgumentBinding, ParameterRef};
pub use catalog::{BoxError, Catalog, FactoryMethod, TypeCatalog, TypeInfo};
pub use compat::{StrictCompatibility, TypeCompatibility};
pub use descriptor::{Parameter, TestDescriptor};
pub use enumerate::{combination_count, enumerate, Combinations};
pub use errors::{ExpansionError, ProviderError, TypeMismatch, ValidationError};
pub use executor::{ExecutionPhase, Expansion, Invoker, TestMethodExecutor};
pub use naming::{format_display_name, DisplayNameFormatter};
pub use outcome::{FailureDetail, FailureKind, InvocationResult, Outcome, OutcomeStatus};
pub use provider::{
    EnumerationValues, FactoryValues, LiteralValues, Provider, ProviderContext, ValueProvider, Values,
};
pub use value::{EnumMember, EnumType, EnumValues, TypeTag, Value};
