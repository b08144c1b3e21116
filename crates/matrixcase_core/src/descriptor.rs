//! Host-supplied descriptors of the test function being expanded.

use crate::value::TypeTag;

/// One declared parameter of a test function. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    ty: TypeTag,
    ordinal: usize,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeTag, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            ty,
            ordinal,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeTag {
        &self.ty
    }

    /// 0-based position in the parameter list.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// A test function: its name, optional declaring type and ordered parameter list.
///
/// ## Notes
/// - The declaring type is the default scope for factory-method lookups that do not name one.
/// - Parameters added with [`TestDescriptor::with_parameter`] get consecutive ordinals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDescriptor {
    name: String,
    declaring_type: Option<String>,
    parameters: Vec<Parameter>,
}

impl TestDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declaring_type: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_declaring_type(mut self, declaring_type: impl Into<String>) -> Self {
        self.declaring_type = Some(declaring_type.into());
        self
    }

    /// Append a parameter at the next ordinal.
    pub fn with_parameter(mut self, name: impl Into<String>, ty: TypeTag) -> Self {
        let ordinal = self.parameters.len();
        self.parameters.push(Parameter::new(name, ty, ordinal));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Find the single parameter with this exact name.
    pub fn parameter_named(&self, name: &str) -> Option<&Parameter> {
        let mut matches = self.parameters.iter().filter(|p| p.name == name);
        match (matches.next(), matches.next()) {
            (Some(p), None) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_parameter_assigns_ordinals() {
        let test = TestDescriptor::new("t")
            .with_parameter("a", TypeTag::Int)
            .with_parameter("b", TypeTag::Text);
        let ordinals: Vec<usize> = test.parameters().iter().map(Parameter::ordinal).collect();
        assert_eq!(ordinals, vec![0, 1]);
    }

    #[test]
    fn test_parameter_named_requires_unique_match() {
        let test = TestDescriptor::new("t")
            .with_parameter("a", TypeTag::Int)
            .with_parameter("a", TypeTag::Int)
            .with_parameter("b", TypeTag::Int);
        assert!(test.parameter_named("a").is_none());
        assert_eq!(test.parameter_named("b").map(Parameter::ordinal), Some(2));
        assert!(test.parameter_named("c").is_none());
    }
}
