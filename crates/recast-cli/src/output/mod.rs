pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use recast_core::round_cents;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten nested objects into dotted keys, skipping arrays of objects
/// (schedules), which formatters print as tables of their own.
pub(crate) fn flatten_scalars(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_scalars(&name, inner, out),
            Value::Array(items) if items.iter().any(Value::is_object) => {}
            _ => out.push((name, val.clone())),
        }
    }
}

/// Arrays of row objects inside a result, e.g. `original_schedule`.
pub(crate) fn row_tables(map: &Map<String, Value>) -> Vec<(&str, &[Value])> {
    map.iter()
        .filter_map(|(key, val)| match val {
            Value::Array(items) if items.iter().any(Value::is_object) => {
                Some((key.as_str(), items.as_slice()))
            }
            _ => None,
        })
        .collect()
}

/// Render a value for humans: decimal strings are rounded to cents.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(d) if d.scale() > 2 => format!("{:.2}", round_cents(d)),
            _ => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(display_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value_rounds_to_cents() {
        assert_eq!(display_value(&json!("2.999")), "3.00");
        assert_eq!(display_value(&json!("1.005")), "1.01");
        assert_eq!(display_value(&json!("3599.6649")), "3599.66");
        assert_eq!(display_value(&json!("-0.005")), "-0.01");
    }

    #[test]
    fn test_display_value_passes_other_values_through() {
        assert_eq!(display_value(&json!("12.5")), "12.5");
        assert_eq!(display_value(&json!("never")), "never");
        assert_eq!(display_value(&json!(348)), "348");
        assert_eq!(display_value(&Value::Null), "-");
    }
}
