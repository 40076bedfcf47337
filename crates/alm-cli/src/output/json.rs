use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print a result envelope or listing as JSON on stdout.
///
/// Decimals are already strings in the envelope, so amounts keep full
/// precision for downstream tools.
pub fn print_json(value: &Value) {
    let rendered = match serde_json::to_string_pretty(value) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("JSON serialization error: {}", e);
            return;
        }
    };
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{}", rendered);
}
