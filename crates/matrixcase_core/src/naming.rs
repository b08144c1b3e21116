//! Deterministic, sortable display names for expanded invocations.
//!
//! Format: `#<seq>: <test>(<arg>, <arg>, ...)` with `seq` 1-based and zero-padded to the digit width of the total
//! combination count.

use crate::value::Value;

/// Decimal digit width of `total`, floored at 1.
pub fn digit_width(total: usize) -> usize {
    if total <= 1 {
        1
    } else {
        total.ilog10() as usize + 1
    }
}

/// Render one argument for a display name.
///
/// ## Notes
/// - Text is wrapped in double quotes verbatim. Embedded quotes are not escaped.
/// - Enumeration members render as `Type.Member`, null as `null`, everything else via `Display`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Text(s) => format!("\"{}\"", s),
        Value::Enum(member) => format!("{}.{}", member.type_name, member.member),
        other => other.to_string(),
    }
}

/// Formats names for one expansion at a fixed padding width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayNameFormatter {
    width: usize,
}

impl DisplayNameFormatter {
    /// Formatter for an expansion of `total` combinations. An unknown (overflowed) total pads to width 1.
    pub fn for_total(total: Option<usize>) -> Self {
        Self {
            width: total.map_or(1, digit_width),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn format(&self, test_name: &str, sequence: usize, args: &[Value]) -> String {
        let mut name = format!("#{:0width$}: {}(", sequence, test_name, width = self.width);
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                name.push_str(", ");
            }
            name.push_str(&render_value(arg));
        }
        name.push(')');
        name
    }
}

/// One-shot form of [`DisplayNameFormatter::format`].
pub fn format_display_name(test_name: &str, sequence: usize, total: usize, args: &[Value]) -> String {
    DisplayNameFormatter::for_total(Some(total)).format(test_name, sequence, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_width() {
        assert_eq!(digit_width(0), 1);
        assert_eq!(digit_width(1), 1);
        assert_eq!(digit_width(9), 1);
        assert_eq!(digit_width(10), 2);
        assert_eq!(digit_width(99), 2);
        assert_eq!(digit_width(100), 3);
        assert_eq!(digit_width(usize::MAX), 20);
    }

    #[test]
    fn test_render_values() {
        assert_eq!(render_value(&Value::Null), "null");
        assert_eq!(render_value(&Value::text("a\"b")), "\"a\"b\"");
        assert_eq!(render_value(&Value::enum_member("Color", "Red")), "Color.Red");
        assert_eq!(render_value(&Value::Int(-3)), "-3");
        assert_eq!(render_value(&Value::Bool(true)), "true");
    }

    #[test]
    fn test_pads_to_total_width() {
        let args = [Value::Int(1), Value::text("x")];
        assert_eq!(format_display_name("add", 7, 100, &args), "#007: add(1, \"x\")");
        assert_eq!(format_display_name("add", 100, 100, &args), "#100: add(1, \"x\")");
    }

    #[test]
    fn test_no_arguments_and_degenerate_total() {
        assert_eq!(format_display_name("t", 1, 1, &[]), "#1: t()");
        assert_eq!(format_display_name("t", 1, 0, &[]), "#1: t()");
        assert_eq!(DisplayNameFormatter::for_total(None).width(), 1);
    }
}
