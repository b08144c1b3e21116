//! Value providers: the capability "produce an ordered, finite list of candidate values for one parameter".
//!
//! ## Notes
//! - [`Provider`] is the closed set of built-in variants plus a `Custom` escape hatch for host-defined providers.
//!   The validator and enumerator only ever call [`ValueProvider::values`].
//! - Results are shared slices so a memoized factory result is the same allocation on every call.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::catalog::{qualified_name, TypeCatalog, TypeInfo};
use crate::descriptor::{Parameter, TestDescriptor};
use crate::errors::ProviderError;
use crate::value::{EnumValues, Value};

/// An ordered value list produced by a provider.
pub type Values = Arc<[Value]>;

/// What a provider sees when asked for values.
#[derive(Clone, Copy)]
pub struct ProviderContext<'a> {
    pub test: &'a TestDescriptor,
    pub parameter: &'a Parameter,
    pub catalog: &'a dyn TypeCatalog,
}

impl fmt::Debug for ProviderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderContext")
            .field("test", &self.test.name())
            .field("parameter", &self.parameter.name())
            .finish_non_exhaustive()
    }
}

/// Produce the candidate values for one parameter.
pub trait ValueProvider: fmt::Debug {
    fn values(&self, ctx: &ProviderContext<'_>) -> Result<Values, ProviderError>;
}

/// A fixed, non-empty list supplied at construction.
#[derive(Debug, Clone)]
pub struct LiteralValues {
    values: Values,
}

impl LiteralValues {
    pub fn new<I, V>(values: I) -> Result<Self, ProviderError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(ProviderError::EmptyLiteral);
        }
        Ok(Self { values: values.into() })
    }
}

impl ValueProvider for LiteralValues {
    fn values(&self, _ctx: &ProviderContext<'_>) -> Result<Values, ProviderError> {
        Ok(Arc::clone(&self.values))
    }
}

/// Every member of an enumeration type, in declaration order.
#[derive(Debug, Clone)]
pub struct EnumerationValues {
    type_name: String,
}

impl EnumerationValues {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    /// Refer to a Rust enum by its [`EnumValues::type_name`]; the catalog must still know it.
    pub fn of<T: EnumValues>() -> Self {
        Self::new(T::type_name())
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl ValueProvider for EnumerationValues {
    fn values(&self, ctx: &ProviderContext<'_>) -> Result<Values, ProviderError> {
        match ctx.catalog.lookup_type(&self.type_name) {
            Some(TypeInfo::Enumeration(ty)) => Ok(ty.values().into()),
            Some(TypeInfo::Opaque(_)) => Err(ProviderError::NotAnEnumeration {
                type_name: self.type_name.clone(),
            }),
            None => Err(ProviderError::UnknownType {
                type_name: self.type_name.clone(),
            }),
        }
    }
}

/// The collection returned by a static, zero-argument factory method, computed once per provider instance.
#[derive(Debug)]
pub struct FactoryValues {
    method: String,
    declaring_type: Option<String>,
    cache: OnceLock<Values>,
}

impl FactoryValues {
    /// A factory on the test's own declaring type.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            declaring_type: None,
            cache: OnceLock::new(),
        }
    }

    /// A factory on an explicitly named type.
    pub fn in_type(declaring_type: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            declaring_type: Some(declaring_type.into()),
            ..Self::new(method)
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    fn compute(&self, ctx: &ProviderContext<'_>) -> Result<Values, ProviderError> {
        let declaring_type = self.declaring_type.as_deref().or(ctx.test.declaring_type());
        let name = qualified_name(declaring_type, &self.method);

        let method = ctx
            .catalog
            .lookup_factory(declaring_type, &self.method)
            .ok_or_else(|| ProviderError::FactoryNotFound { method: name.clone() })?;
        if !method.is_static() {
            return Err(ProviderError::FactoryNotStatic { method: name });
        }
        if method.arity() > 0 {
            return Err(ProviderError::FactoryTakesParameters {
                method: name,
                arity: method.arity(),
            });
        }

        match method.invoke() {
            Ok(Value::List(items)) => Ok(items.into()),
            Ok(Value::Null) => Err(ProviderError::FactoryReturnedNull { method: name }),
            Ok(other) => Err(ProviderError::FactoryNotIterable {
                method: name,
                returned: other.kind_name(),
            }),
            Err(source) => Err(ProviderError::FactoryFailed { method: name, source }),
        }
    }
}

impl ValueProvider for FactoryValues {
    fn values(&self, ctx: &ProviderContext<'_>) -> Result<Values, ProviderError> {
        if let Some(cached) = self.cache.get() {
            tracing::trace!(method = %self.method, "reusing memoized factory values");
            return Ok(Arc::clone(cached));
        }
        let values = self.compute(ctx)?;
        Ok(Arc::clone(self.cache.get_or_init(|| values)))
    }
}

/// The built-in provider variants plus host-defined ones.
#[derive(Debug)]
pub enum Provider {
    Literal(LiteralValues),
    Enumeration(EnumerationValues),
    Factory(FactoryValues),
    Custom(Box<dyn ValueProvider>),
}

impl Provider {
    pub fn literal<I, V>(values: I) -> Result<Self, ProviderError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        LiteralValues::new(values).map(Provider::Literal)
    }

    pub fn enumeration(type_name: impl Into<String>) -> Self {
        Provider::Enumeration(EnumerationValues::new(type_name))
    }

    pub fn enumeration_of<T: EnumValues>() -> Self {
        Provider::Enumeration(EnumerationValues::of::<T>())
    }

    pub fn factory(method: impl Into<String>) -> Self {
        Provider::Factory(FactoryValues::new(method))
    }

    pub fn factory_in(declaring_type: impl Into<String>, method: impl Into<String>) -> Self {
        Provider::Factory(FactoryValues::in_type(declaring_type, method))
    }

    pub fn custom(provider: impl ValueProvider + 'static) -> Self {
        Provider::Custom(Box::new(provider))
    }
}

impl ValueProvider for Provider {
    fn values(&self, ctx: &ProviderContext<'_>) -> Result<Values, ProviderError> {
        match self {
            Provider::Literal(p) => p.values(ctx),
            Provider::Enumeration(p) => p.values(ctx),
            Provider::Factory(p) => p.values(ctx),
            Provider::Custom(p) => p.values(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::catalog::{Catalog, FactoryMethod};
    use crate::value::{EnumType, TypeTag};

    fn with_ctx<R>(catalog: &Catalog, f: impl FnOnce(&ProviderContext<'_>) -> R) -> R {
        let test = TestDescriptor::new("test_subject")
            .with_declaring_type("Suite")
            .with_parameter("p", TypeTag::Any);
        let ctx = ProviderContext {
            test: &test,
            parameter: &test.parameters()[0],
            catalog,
        };
        f(&ctx)
    }

    #[test]
    fn test_literal_rejects_empty_list() {
        assert!(matches!(
            LiteralValues::new(Vec::<Value>::new()),
            Err(ProviderError::EmptyLiteral)
        ));
    }

    #[test]
    fn test_enumeration_yields_members_in_order() {
        let mut catalog = Catalog::new();
        catalog.register_enum(EnumType::new("Light", ["Red", "Amber", "Green"]));
        let values = with_ctx(&catalog, |ctx| EnumerationValues::new("Light").values(ctx)).unwrap();
        let names: Vec<String> = values.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["Light.Red", "Light.Amber", "Light.Green"]);
    }

    #[test]
    fn test_enumeration_rejects_non_enum_type() {
        let mut catalog = Catalog::new();
        catalog.register_type("Session");
        let err = with_ctx(&catalog, |ctx| EnumerationValues::new("Session").values(ctx)).unwrap_err();
        assert!(matches!(err, ProviderError::NotAnEnumeration { .. }));
        let err = with_ctx(&catalog, |ctx| EnumerationValues::new("Nope").values(ctx)).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownType { .. }));
    }

    #[test]
    fn test_factory_is_memoized() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut catalog = Catalog::new();
        catalog.register_factory(FactoryMethod::new(Some("Suite"), "sizes", move || {
            counter.set(counter.get() + 1);
            Ok(Value::List(vec![Value::Int(1), Value::Int(2)]))
        }));

        let provider = FactoryValues::new("sizes");
        let first = with_ctx(&catalog, |ctx| provider.values(ctx)).unwrap();
        let second = with_ctx(&catalog, |ctx| provider.values(ctx)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_factory_caches_are_per_instance() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut catalog = Catalog::new();
        catalog.register_factory(FactoryMethod::new(Some("Suite"), "sizes", move || {
            counter.set(counter.get() + 1);
            Ok(Value::List(vec![Value::Int(1)]))
        }));

        for _ in 0..2 {
            let provider = FactoryValues::new("sizes");
            with_ctx(&catalog, |ctx| provider.values(ctx)).unwrap();
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_factory_signature_and_result_checks() {
        let mut catalog = Catalog::new();
        catalog
            .register_factory(FactoryMethod::new(Some("Suite"), "instance", || Ok(Value::List(vec![]))).instance())
            .register_factory(
                FactoryMethod::new(Some("Suite"), "needs_arg", || Ok(Value::List(vec![]))).with_arity(1),
            )
            .register_factory(FactoryMethod::new(Some("Suite"), "scalar", || Ok(Value::Int(3))))
            .register_factory(FactoryMethod::new(Some("Suite"), "nothing", || Ok(Value::Null)))
            .register_factory(FactoryMethod::new(Some("Suite"), "broken", || Err("disk on fire".into())));

        let run = |method: &str| with_ctx(&catalog, |ctx| FactoryValues::new(method).values(ctx)).unwrap_err();

        assert!(matches!(run("missing"), ProviderError::FactoryNotFound { .. }));
        assert!(matches!(run("instance"), ProviderError::FactoryNotStatic { .. }));
        assert!(matches!(run("needs_arg"), ProviderError::FactoryTakesParameters { arity: 1, .. }));
        assert!(matches!(run("scalar"), ProviderError::FactoryNotIterable { returned: "int", .. }));
        assert!(matches!(run("nothing"), ProviderError::FactoryReturnedNull { .. }));
        match run("broken") {
            ProviderError::FactoryFailed { method, source } => {
                assert_eq!(method, "Suite.broken");
                assert_eq!(source.to_string(), "disk on fire");
            }
            other => panic!("expected FactoryFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_factory_in_explicit_type() {
        let mut catalog = Catalog::new();
        catalog.register_factory(FactoryMethod::new(Some("Shared"), "ids", || {
            Ok(Value::List(vec![Value::Int(7)]))
        }));
        let values = with_ctx(&catalog, |ctx| FactoryValues::in_type("Shared", "ids").values(ctx)).unwrap();
        assert_eq!(&*values, &[Value::Int(7)]);
    }
}
