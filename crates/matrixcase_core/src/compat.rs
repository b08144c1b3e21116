//! Pluggable "is this value assignable to that parameter type" predicate.

use crate::value::{TypeTag, Value};

/// Decide whether a produced value may be passed to a parameter of the declared type.
///
/// `Null` is accepted for every type before this predicate is consulted, so implementations only see non-null
/// values.
pub trait TypeCompatibility {
    fn is_assignable(&self, value: &Value, ty: &TypeTag) -> bool;
}

impl<F> TypeCompatibility for F
where
    F: Fn(&Value, &TypeTag) -> bool,
{
    fn is_assignable(&self, value: &Value, ty: &TypeTag) -> bool {
        self(value, ty)
    }
}

/// Same-kind assignability with no implicit conversions.
///
/// ## Notes
/// - `Any` accepts everything; `Named` types accept nothing (only a host predicate knows them).
/// - `Int` is not assignable to `Float`.
/// - Enum members are only assignable to the enumeration they belong to.
/// - Lists are checked element-wise.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictCompatibility;

impl TypeCompatibility for StrictCompatibility {
    fn is_assignable(&self, value: &Value, ty: &TypeTag) -> bool {
        match (ty, value) {
            (_, Value::Null) | (TypeTag::Any, _) => true,
            (TypeTag::Bool, Value::Bool(_))
            | (TypeTag::Int, Value::Int(_))
            | (TypeTag::Float, Value::Float(_))
            | (TypeTag::Text, Value::Text(_)) => true,
            (TypeTag::Enum(name), Value::Enum(member)) => member.type_name == *name,
            (TypeTag::List(elem), Value::List(items)) => items.iter().all(|item| self.is_assignable(item, elem)),
            _ => false,
        }
    }
}

/// Check assignability, treating `Null` as compatible with every declared type.
pub fn accepts(compat: &dyn TypeCompatibility, value: &Value, ty: &TypeTag) -> bool {
    value.is_null() || compat.is_assignable(value, ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_matches_same_kinds_only() {
        let c = StrictCompatibility;
        assert!(c.is_assignable(&Value::Int(1), &TypeTag::Int));
        assert!(!c.is_assignable(&Value::Int(1), &TypeTag::Float));
        assert!(!c.is_assignable(&Value::text("1"), &TypeTag::Int));
        assert!(c.is_assignable(&Value::text("x"), &TypeTag::Any));
        assert!(!c.is_assignable(&Value::text("x"), &TypeTag::Named("Session".into())));
    }

    #[test]
    fn test_strict_checks_enum_type_name() {
        let c = StrictCompatibility;
        let red = Value::enum_member("Color", "Red");
        assert!(c.is_assignable(&red, &TypeTag::Enum("Color".into())));
        assert!(!c.is_assignable(&red, &TypeTag::Enum("Shape".into())));
        assert!(!c.is_assignable(&Value::text("Red"), &TypeTag::Enum("Color".into())));
    }

    #[test]
    fn test_strict_checks_list_elements() {
        let c = StrictCompatibility;
        let ty = TypeTag::List(Box::new(TypeTag::Int));
        assert!(c.is_assignable(&Value::List(vec![Value::Int(1), Value::Null]), &ty));
        assert!(!c.is_assignable(&Value::List(vec![Value::Int(1), Value::Bool(true)]), &ty));
    }

    #[test]
    fn test_null_is_always_accepted() {
        let never = |_: &Value, _: &TypeTag| false;
        assert!(accepts(&never, &Value::Null, &TypeTag::Int));
        assert!(!accepts(&never, &Value::Int(3), &TypeTag::Int));
    }
}
