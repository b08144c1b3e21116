//! Association of one value provider with one test parameter.

use std::fmt;

use crate::provider::Provider;

/// Which parameter a binding targets: by 0-based position or by name, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for ParameterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterRef::Index(i) => write!(f, "#{}", i),
            ParameterRef::Name(name) => write!(f, "`{}`", name),
        }
    }
}

/// A value provider bound to one parameter. Immutable once built.
#[derive(Debug)]
pub struct ArgumentBinding {
    target: ParameterRef,
    provider: Provider,
}

impl ArgumentBinding {
    pub fn new(target: ParameterRef, provider: Provider) -> Self {
        Self { target, provider }
    }

    pub fn at_index(index: usize, provider: Provider) -> Self {
        Self::new(ParameterRef::Index(index), provider)
    }

    pub fn named(name: impl Into<String>, provider: Provider) -> Self {
        Self::new(ParameterRef::Name(name.into()), provider)
    }

    pub fn target(&self) -> &ParameterRef {
        &self.target
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }
}
