//! Matrix declaration files
//!
//! A declaration file is JSON describing one parameterized test method: its parameters, the enumerations and
//! factory methods the catalog should know, one binding per parameter and the command that acts as the test body.
//!
//! ## Notes
//!
//! - Factory methods are external commands whose stdout is parsed as JSON. A factory is only run when expansion asks
//!   for its values, so `list` on a file with factories still runs them.
//! - Loading checks the file's own shape (one target and one provider per binding). Whether bindings match the test's
//!   parameters is the engine's job and is reported as an error outcome, not a load error.

use std::collections::BTreeMap;
use std::rc::Rc;

use matrixcase_core::{
    ArgumentBinding, Catalog, EnumType, FactoryMethod, ProviderError, Provider, TestDescriptor, TypeTag, Value,
};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Deserialize;
use thiserror::Error;

use super::interfaces::CommandRunner;

// ============================================================================
// Errors
// ============================================================================

/// A declaration file that cannot be turned into a test expansion.
#[derive(Debug, Error, Diagnostic)]
pub enum DeclarationError {
    #[error("invalid declaration file: {message}")]
    #[diagnostic(
        code(matrixcase::declaration::syntax),
        help("see the declaration file format in the README")
    )]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("binding #{binding} must set exactly one of `index` or `name`")]
    #[diagnostic(code(matrixcase::declaration::binding_target))]
    BindingTarget { binding: usize },

    #[error("binding #{binding} must set exactly one of `values`, `enum` or `factory`")]
    #[diagnostic(code(matrixcase::declaration::binding_provider))]
    BindingProvider { binding: usize },

    #[error("binding #{binding} has an invalid literal value list")]
    #[diagnostic(code(matrixcase::declaration::literal))]
    Literal {
        binding: usize,
        #[source]
        source: ProviderError,
    },

    #[error("unsupported value in {context}")]
    #[diagnostic(
        code(matrixcase::declaration::value),
        help("values are null, booleans, numbers, strings, arrays or {{\"enum\": \"Type\", \"member\": \"Name\"}}")
    )]
    Value {
        context: String,
        #[source]
        source: UnsupportedValue,
    },

    #[error("factory `{factory}` declares an empty command")]
    #[diagnostic(code(matrixcase::declaration::factory_command))]
    EmptyFactoryCommand { factory: String },
}

/// A JSON value with no [`Value`] counterpart.
#[derive(Debug, Error)]
#[error("cannot convert {0} into a test argument")]
pub struct UnsupportedValue(String);

// ============================================================================
// File format
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationFile {
    test: TestDecl,
    #[serde(default)]
    enums: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    factories: Vec<FactoryDecl>,
    #[serde(default)]
    bindings: Vec<BindingDecl>,
    #[serde(default)]
    command: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestDecl {
    name: String,
    #[serde(default)]
    declaring_type: Option<String>,
    #[serde(default)]
    parameters: Vec<ParameterDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterDecl {
    name: String,
    #[serde(rename = "type", default)]
    ty: TypeDecl,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeDecl {
    Simple(SimpleType),
    Compound(CompoundType),
}

impl Default for TypeDecl {
    fn default() -> Self {
        TypeDecl::Simple(SimpleType::Any)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SimpleType {
    Any,
    Bool,
    Int,
    Float,
    Text,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CompoundType {
    Enum(String),
    List(Box<TypeDecl>),
    Named(String),
}

impl TypeDecl {
    fn to_tag(&self) -> TypeTag {
        match self {
            TypeDecl::Simple(SimpleType::Any) => TypeTag::Any,
            TypeDecl::Simple(SimpleType::Bool) => TypeTag::Bool,
            TypeDecl::Simple(SimpleType::Int) => TypeTag::Int,
            TypeDecl::Simple(SimpleType::Float) => TypeTag::Float,
            TypeDecl::Simple(SimpleType::Text) => TypeTag::Text,
            TypeDecl::Compound(CompoundType::Enum(name)) => TypeTag::Enum(name.clone()),
            TypeDecl::Compound(CompoundType::List(elem)) => TypeTag::List(Box::new(elem.to_tag())),
            TypeDecl::Compound(CompoundType::Named(name)) => TypeTag::Named(name.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FactoryDecl {
    #[serde(default)]
    declaring_type: Option<String>,
    name: String,
    command: Vec<String>,
    /// Declared as an instance method; such factories are rejected at expansion time.
    #[serde(default)]
    instance: bool,
    #[serde(default)]
    arity: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BindingDecl {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    values: Option<Vec<serde_json::Value>>,
    #[serde(default, rename = "enum")]
    enumeration: Option<String>,
    #[serde(default)]
    factory: Option<FactoryRefDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FactoryRefDecl {
    method: String,
    #[serde(default)]
    declaring_type: Option<String>,
}

// ============================================================================
// Loading
// ============================================================================

/// A loaded declaration: everything the executor needs plus the test command.
#[derive(Debug)]
pub struct Declaration {
    pub test: TestDescriptor,
    pub bindings: Vec<ArgumentBinding>,
    pub catalog: Catalog,
    pub command: Vec<String>,
}

/// Parse and convert a declaration file.
///
/// ## Parameters
/// - `source`: the file contents.
/// - `origin`: file name shown in diagnostics.
/// - `runner`: used later by factory methods to run their commands.
///
/// ## Errors
/// - [`DeclarationError::Syntax`] with a source span when the JSON is malformed or has the wrong shape.
/// - A binding, value or factory error when the parsed file describes something unrepresentable.
#[tracing::instrument(skip_all, fields(origin = %origin))]
pub fn load(source: &str, origin: &str, runner: Rc<dyn CommandRunner>) -> Result<Declaration, DeclarationError> {
    let file: DeclarationFile = serde_json::from_str(source).map_err(|e| DeclarationError::Syntax {
        message: e.to_string(),
        src: NamedSource::new(origin, source.to_string()),
        span: SourceSpan::from((offset_of(source, e.line(), e.column()), 1)),
    })?;

    let mut test = TestDescriptor::new(file.test.name);
    if let Some(declaring_type) = file.test.declaring_type {
        test = test.with_declaring_type(declaring_type);
    }
    for parameter in &file.test.parameters {
        test = test.with_parameter(parameter.name.as_str(), parameter.ty.to_tag());
    }

    let mut catalog = Catalog::new();
    for (name, members) in file.enums {
        catalog.register_enum(EnumType::new(name, members));
    }
    for name in file.types {
        catalog.register_type(name);
    }
    for factory in file.factories {
        catalog.register_factory(factory_method(factory, &runner)?);
    }

    let bindings = file
        .bindings
        .into_iter()
        .enumerate()
        .map(|(i, binding)| convert_binding(i, binding))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(test = %test.name(), bindings = bindings.len(), "declaration loaded");
    Ok(Declaration {
        test,
        bindings,
        catalog,
        command: file.command,
    })
}

fn factory_method(decl: FactoryDecl, runner: &Rc<dyn CommandRunner>) -> Result<FactoryMethod, DeclarationError> {
    if decl.command.is_empty() {
        return Err(DeclarationError::EmptyFactoryCommand { factory: decl.name });
    }
    let runner = Rc::clone(runner);
    let command = decl.command;
    let program = command.first().cloned().unwrap_or_default();
    let mut method = FactoryMethod::new(decl.declaring_type.as_deref(), decl.name, move || {
        let output = runner.run(&command, &[])?.into_success(&program)?;
        let json: serde_json::Value = serde_json::from_str(output.stdout.trim())?;
        Ok(json_to_value(&json)?)
    })
    .with_arity(decl.arity);
    if decl.instance {
        method = method.instance();
    }
    Ok(method)
}

fn convert_binding(i: usize, decl: BindingDecl) -> Result<ArgumentBinding, DeclarationError> {
    let provider = match (decl.values, decl.enumeration, decl.factory) {
        (Some(values), None, None) => {
            let values = values
                .iter()
                .map(json_to_value)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| DeclarationError::Value {
                    context: format!("binding #{}", i),
                    source,
                })?;
            Provider::literal(values).map_err(|source| DeclarationError::Literal { binding: i, source })?
        }
        (None, Some(type_name), None) => Provider::enumeration(type_name),
        (None, None, Some(FactoryRefDecl { method, declaring_type })) => match declaring_type {
            Some(ty) => Provider::factory_in(ty, method),
            None => Provider::factory(method),
        },
        _ => return Err(DeclarationError::BindingProvider { binding: i }),
    };

    match (decl.index, decl.name) {
        (Some(index), None) => Ok(ArgumentBinding::at_index(index, provider)),
        (None, Some(name)) => Ok(ArgumentBinding::named(name, provider)),
        _ => Err(DeclarationError::BindingTarget { binding: i }),
    }
}

/// Convert declaration JSON into an engine value.
///
/// ## Notes
/// - Integers that fit `i64` become `Int`; other numbers become `Float`.
/// - `{"enum": T, "member": M}` is the only accepted object shape.
pub fn json_to_value(json: &serde_json::Value) -> Result<Value, UnsupportedValue> {
    use serde_json::Value as Json;

    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int(i)),
            None => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| UnsupportedValue(n.to_string())),
        },
        Json::String(s) => Ok(Value::Text(s.clone())),
        Json::Array(items) => items.iter().map(json_to_value).collect::<Result<Vec<_>, _>>().map(Value::List),
        Json::Object(map) => match (map.get("enum"), map.get("member"), map.len()) {
            (Some(Json::String(ty)), Some(Json::String(member)), 2) => Ok(Value::enum_member(ty.as_str(), member.as_str())),
            _ => Err(UnsupportedValue(json.to_string())),
        },
    }
}

/// Byte offset of a 1-based line/column position, clamped to the source length.
fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len().saturating_sub(1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::interfaces::ProcessRunner;
    use matrixcase_core::ParameterRef;

    fn load_str(source: &str) -> Result<Declaration, DeclarationError> {
        load(source, "test.json", Rc::new(ProcessRunner))
    }

    #[test]
    fn test_parameter_types_and_bindings() {
        let decl = load_str(
            r#"{
                "test": { "name": "t", "parameters": [
                    { "name": "a", "type": "int" },
                    { "name": "b", "type": { "list": { "enum": "Role" } } },
                    { "name": "c" }
                ] },
                "bindings": [
                    { "index": 0, "values": [1, 2] },
                    { "name": "b", "enum": "Role" },
                    { "name": "c", "factory": { "method": "m", "declaring_type": "T" } }
                ]
            }"#,
        )
        .unwrap();
        let tags: Vec<String> = decl.test.parameters().iter().map(|p| p.ty().to_string()).collect();
        assert_eq!(tags, vec!["int", "list[Role]", "any"]);
        assert_eq!(decl.bindings[1].target(), &ParameterRef::Name("b".into()));
        assert!(decl.command.is_empty());
    }

    #[test]
    fn test_binding_needs_exactly_one_target() {
        let err = load_str(r#"{ "test": { "name": "t" }, "bindings": [ { "index": 0, "name": "a", "values": [1] } ] }"#)
            .unwrap_err();
        assert!(matches!(err, DeclarationError::BindingTarget { binding: 0 }));
    }

    #[test]
    fn test_binding_needs_exactly_one_provider() {
        let err = load_str(r#"{ "test": { "name": "t" }, "bindings": [ { "index": 0 } ] }"#).unwrap_err();
        assert!(matches!(err, DeclarationError::BindingProvider { binding: 0 }));
    }

    #[test]
    fn test_empty_literal_list_is_rejected() {
        let err = load_str(r#"{ "test": { "name": "t" }, "bindings": [ { "index": 0, "values": [] } ] }"#).unwrap_err();
        assert!(matches!(err, DeclarationError::Literal { binding: 0, .. }));
    }

    #[test]
    fn test_syntax_error_points_into_source() {
        let source = "{\n  \"test\": oops\n}";
        match load_str(source).unwrap_err() {
            DeclarationError::Syntax { span, .. } => {
                let token = source.find("oops").unwrap();
                assert!((token..token + 4).contains(&span.offset()), "offset {}", span.offset());
            }
            other => panic!("expected Syntax, got {other:?}"),
        }
    }

    #[test]
    fn test_json_values() {
        let json: serde_json::Value =
            serde_json::from_str(r#"[null, true, 3, 2.5, "s", {"enum": "Role", "member": "Admin"}]"#).unwrap();
        let value = json_to_value(&json).unwrap();
        assert_eq!(value.to_string(), "[null, true, 3, 2.5, s, Role.Admin]");

        let bad: serde_json::Value = serde_json::from_str(r#"{"x": 1}"#).unwrap();
        assert!(json_to_value(&bad).is_err());
    }
}
