//! Runtime values handed to test parameters, and the declared types they are checked against.
//!
//! A [`Value`] is the engine's opaque payload: the engine only clones, renders and hands values to the host. The
//! host decides what a value *means* when it invokes the test body.

use std::fmt;

/// A single member of an enumeration type, e.g. `Color.Red`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumMember {
    pub type_name: String,
    pub member: String,
}

impl EnumMember {
    pub fn new(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: member.into(),
        }
    }
}

impl fmt::Display for EnumMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.member)
    }
}

/// Dynamically-typed datum supplied to one parameter for one combination.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Enum(EnumMember),
    List(Vec<Value>),
}

impl Value {
    /// Build a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Build an enumeration member value.
    pub fn enum_member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Value::Enum(EnumMember::new(type_name, member))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value's runtime kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Enum(_) => "enum member",
            Value::List(_) => "list",
        }
    }
}

/// Default string representation.
///
/// Text is written raw here; quoting is a display-name concern (see [`crate::naming::render_value`]).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Enum(m) => write!(f, "{}", m),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<EnumMember> for Value {
    fn from(m: EnumMember) -> Self {
        Value::Enum(m)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Declared type of a test parameter.
///
/// This is a semantic tag, not a Rust type: the host maps its own parameter types onto it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Accepts any value.
    Any,
    Bool,
    Int,
    Float,
    Text,
    /// An enumeration, by type name.
    Enum(String),
    /// A homogeneous list of the element type.
    List(Box<TypeTag>),
    /// A host-defined type the built-in value kinds never satisfy.
    Named(String),
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Any => f.write_str("any"),
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::Int => f.write_str("int"),
            TypeTag::Float => f.write_str("float"),
            TypeTag::Text => f.write_str("text"),
            TypeTag::Enum(name) | TypeTag::Named(name) => f.write_str(name),
            TypeTag::List(elem) => write!(f, "list[{}]", elem),
        }
    }
}

/// An enumeration type: its name and members in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    members: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Every member as a [`Value::Enum`], in declaration order.
    pub fn values(&self) -> Vec<Value> {
        self.members
            .iter()
            .map(|m| Value::enum_member(self.name.clone(), m.clone()))
            .collect()
    }

    /// Resolve a member by name.
    pub fn member(&self, name: &str) -> Option<Value> {
        self.members
            .iter()
            .find(|m| m.as_str() == name)
            .map(|m| Value::enum_member(self.name.clone(), m.clone()))
    }
}

/// Rust enums usable as enumeration-derived value sources.
///
/// Usually derived with `#[derive(EnumValues)]` from `matrixcase_derive`; the derive only accepts unit-only enums.
pub trait EnumValues {
    /// Name of the enumeration type as it appears in display names.
    fn type_name() -> &'static str;

    /// Member names in declaration order.
    fn member_names() -> &'static [&'static str];

    /// Name of this member.
    fn member_name(&self) -> &'static str;

    fn enum_type() -> EnumType {
        EnumType::new(Self::type_name(), Self::member_names().iter().copied())
    }

    fn to_value(&self) -> Value {
        Value::enum_member(Self::type_name(), self.member_name())
    }
}
