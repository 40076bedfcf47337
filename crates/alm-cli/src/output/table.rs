use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten_row, format_value, split_sections, unwrap_result};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go in a Field/Value table; arrays of rows (gap
/// buckets, appetite assessments, listings) get a table each.
pub fn print_table(value: &Value) {
    match unwrap_result(value) {
        Value::Object(res_map) => print_result_object(res_map),
        Value::Array(arr) => print_array_table(arr),
        other => println!("{}", format_value(other)),
    }

    if let Value::Object(envelope) = value {
        print_envelope_notes(envelope);
    }
}

fn print_result_object(res_map: &Map<String, Value>) {
    let (fields, sections) = split_sections(res_map);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        if let Value::Object(inner) = val {
            for (k, v) in inner {
                builder.push_record([format!("{key}.{k}"), format_value(v)]);
            }
        } else {
            builder.push_record([key.to_string(), format_value(val)]);
        }
    }
    println!("{}", Table::from(builder));

    for (name, rows) in sections {
        println!("\n{}:", name);
        print_array_table(rows);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = flatten_row(first).into_iter().map(|(k, _)| k).collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let flat = flatten_row(map);
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        flat.iter()
                            .find(|(k, _)| k == h)
                            .map(|(_, v)| format_value(v))
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
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
