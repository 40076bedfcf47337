use serde_json::Value;

use super::{format_value, unwrap_result};

/// Print just the key answer from the output.
///
/// Stress tests print their summary, gap analyses the horizon cumulative
/// gap, appetite assessments one `metric: status` line each.
pub fn print_minimal(value: &Value) {
    let result_obj = unwrap_result(value);

    let priority_keys = ["report_summary", "status"];

    match result_obj {
        Value::Object(map) => {
            for key in &priority_keys {
                if let Some(val) = map.get(*key) {
                    if !val.is_null() {
                        println!("{}", format_value(val));
                        return;
                    }
                }
            }

            if let Some(Value::Array(buckets)) = map.get("buckets") {
                if let Some(last) = buckets.last().and_then(|b| b.get("cumulative_gap")) {
                    println!("{}", format_value(last));
                    return;
                }
            }

            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, format_value(val));
            }
        }
        Value::Array(items) => {
            for item in items {
                println!("{}", minimal_line(item));
            }
        }
        other => println!("{}", format_value(other)),
    }
}

fn minimal_line(item: &Value) -> String {
    let metric = item
        .pointer("/appetite/metric_name")
        .or_else(|| item.get("id"));
    let status = item.get("status").or_else(|| item.get("name"));
    match (metric, status) {
        (Some(m), Some(s)) => format!("{}: {}", format_value(m), format_value(s)),
        _ => format_value(item),
    }
}
