pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` of a computation envelope, or the value itself for bare listings.
pub fn unwrap_result(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten nested objects one level deep into dotted keys, so that rows such
/// as `{appetite: {metric_name}, status}` fit a single table or CSV line.
pub fn flatten_row(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::with_capacity(map.len());
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (k, v) in inner {
                    out.push((format!("{key}.{k}"), v.clone()));
                }
            }
            other => out.push((key.clone(), other.clone())),
        }
    }
    out
}

/// Split an object into scalar fields and arrays of objects, which are
/// rendered as their own tables.
pub fn split_sections(map: &Map<String, Value>) -> (Vec<(&str, &Value)>, Vec<(&str, &[Value])>) {
    let mut fields = Vec::new();
    let mut sections = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(items) if items.iter().any(Value::is_object) => {
                sections.push((key.as_str(), items.as_slice()));
            }
            other => fields.push((key.as_str(), other)),
        }
    }
    (fields, sections)
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_row_nests_one_level() {
        let row = json!({"appetite": {"metric_name": "LCR"}, "status": "OK"});
        let flat = flatten_row(row.as_object().unwrap());
        assert_eq!(flat[0], ("appetite.metric_name".to_string(), json!("LCR")));
        assert_eq!(flat[1], ("status".to_string(), json!("OK")));
    }

    #[test]
    fn test_split_sections_separates_bucket_rows() {
        let res = json!({"total_assets": "100", "time_buckets": [30, 90], "buckets": [{"bucket": "0-30d"}]});
        let (fields, sections) = split_sections(res.as_object().unwrap());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "buckets");
        assert!(fields.iter().any(|(k, _)| *k == "time_buckets"));
    }

    #[test]
    fn test_unwrap_result_on_bare_array() {
        let bare = json!([1, 2]);
        assert_eq!(unwrap_result(&bare), &bare);
        let env = json!({"result": {"a": 1}});
        assert_eq!(unwrap_result(&env), &json!({"a": 1}));
    }
}
