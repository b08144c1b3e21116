//! Host-supplied type and factory-method resolution.
//!
//! The engine never introspects source-level metadata. Everything an enumeration-derived or factory-derived provider
//! needs to resolve goes through a [`TypeCatalog`], which the host fills from whatever declarative mechanism it has
//! (derive macros, registration calls, a declaration file).

use std::collections::HashMap;
use std::fmt;

use crate::value::{EnumType, EnumValues, Value};

/// Boxed error returned by factory bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type FactoryBody = Box<dyn Fn() -> Result<Value, BoxError>>;

/// What a catalog knows about a named type.
#[derive(Debug, Clone, Copy)]
pub enum TypeInfo<'a> {
    Enumeration(&'a EnumType),
    /// Known, but not an enumeration.
    Opaque(&'a str),
}

/// A factory method: a named function returning a collection of values.
///
/// ## Notes
/// - Only static, zero-argument methods are usable as value sources; the shape is recorded here so the provider can
///   reject anything else with a precise error.
/// - The body returns a single [`Value`]; a provider accepts only [`Value::List`] results.
pub struct FactoryMethod {
    declaring_type: Option<String>,
    name: String,
    is_static: bool,
    arity: usize,
    body: FactoryBody,
}

impl FactoryMethod {
    /// A static, zero-argument factory.
    pub fn new<F>(declaring_type: Option<&str>, name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Result<Value, BoxError> + 'static,
    {
        Self {
            declaring_type: declaring_type.map(str::to_string),
            name: name.into(),
            is_static: true,
            arity: 0,
            body: Box::new(body),
        }
    }

    /// Mark the method as an instance method.
    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    /// Record the number of declared parameters.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// `Type.name`, or just `name` without a declaring type.
    pub fn qualified_name(&self) -> String {
        qualified_name(self.declaring_type(), &self.name)
    }

    pub fn invoke(&self) -> Result<Value, BoxError> {
        (self.body)()
    }
}

impl fmt::Debug for FactoryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryMethod")
            .field("declaring_type", &self.declaring_type)
            .field("name", &self.name)
            .field("is_static", &self.is_static)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

pub(crate) fn qualified_name(declaring_type: Option<&str>, name: &str) -> String {
    match declaring_type {
        Some(ty) => format!("{}.{}", ty, name),
        None => name.to_string(),
    }
}

/// Resolve type names and factory methods on behalf of value providers.
pub trait TypeCatalog {
    fn lookup_type(&self, name: &str) -> Option<TypeInfo<'_>>;

    fn lookup_factory(&self, declaring_type: Option<&str>, name: &str) -> Option<&FactoryMethod>;
}

#[derive(Debug)]
enum TypeEntry {
    Enumeration(EnumType),
    Opaque(String),
}

/// In-memory [`TypeCatalog`] filled by registration calls.
#[derive(Debug, Default)]
pub struct Catalog {
    types: HashMap<String, TypeEntry>,
    factories: HashMap<(Option<String>, String), FactoryMethod>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enumeration. Re-registering a name replaces the earlier entry.
    pub fn register_enum(&mut self, ty: EnumType) -> &mut Self {
        self.types.insert(ty.name().to_string(), TypeEntry::Enumeration(ty));
        self
    }

    /// Register a Rust enum that implements [`EnumValues`].
    pub fn register_enum_of<T: EnumValues>(&mut self) -> &mut Self {
        self.register_enum(T::enum_type())
    }

    /// Register a type that exists but is not an enumeration.
    pub fn register_type(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.types.insert(name.clone(), TypeEntry::Opaque(name));
        self
    }

    pub fn register_factory(&mut self, method: FactoryMethod) -> &mut Self {
        let key = (method.declaring_type.clone(), method.name.clone());
        self.factories.insert(key, method);
        self
    }
}

impl TypeCatalog for Catalog {
    fn lookup_type(&self, name: &str) -> Option<TypeInfo<'_>> {
        self.types.get(name).map(|entry| match entry {
            TypeEntry::Enumeration(ty) => TypeInfo::Enumeration(ty),
            TypeEntry::Opaque(name) => TypeInfo::Opaque(name),
        })
    }

    fn lookup_factory(&self, declaring_type: Option<&str>, name: &str) -> Option<&FactoryMethod> {
        self.factories
            .get(&(declaring_type.map(str::to_string), name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_distinguishes_enums_from_opaque_types() {
        let mut catalog = Catalog::new();
        catalog
            .register_enum(EnumType::new("Color", ["Red"]))
            .register_type("Session");

        assert!(matches!(catalog.lookup_type("Color"), Some(TypeInfo::Enumeration(_))));
        assert!(matches!(catalog.lookup_type("Session"), Some(TypeInfo::Opaque("Session"))));
        assert!(catalog.lookup_type("Missing").is_none());
    }

    #[test]
    fn test_factories_are_scoped_by_declaring_type() {
        let mut catalog = Catalog::new();
        catalog.register_factory(FactoryMethod::new(Some("Suite"), "sizes", || {
            Ok(Value::List(vec![Value::Int(1)]))
        }));

        assert!(catalog.lookup_factory(Some("Suite"), "sizes").is_some());
        assert!(catalog.lookup_factory(Some("Other"), "sizes").is_none());
        assert!(catalog.lookup_factory(None, "sizes").is_none());
    }

    #[test]
    fn test_qualified_name() {
        let m = FactoryMethod::new(None, "plain", || Ok(Value::Null));
        assert_eq!(m.qualified_name(), "plain");
        let m = FactoryMethod::new(Some("Suite"), "scoped", || Ok(Value::Null));
        assert_eq!(m.qualified_name(), "Suite.scoped");
    }
}
