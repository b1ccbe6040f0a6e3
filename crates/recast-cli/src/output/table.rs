use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{display_value, flatten_scalars, result_of, row_tables};

/// Format output as tables using the tabled crate.
///
/// Scalars go into a Field/Value table; every schedule-like array gets its
/// own table underneath, followed by warnings and methodology.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            print_scalar_table(result);
            for (name, rows) in row_tables(result) {
                println!("\n{}", name);
                print_array_table(rows);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        other => println!("{}", display_value(other)),
    }

    if let Some(envelope) = value.as_object() {
        print_envelope_notes(envelope);
    }
}

fn print_scalar_table(map: &Map<String, Value>) {
    let mut fields = Vec::new();
    flatten_scalars("", map, &mut fields);
    if fields.is_empty() {
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.clone(), display_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(display_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", display_value(item));
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
