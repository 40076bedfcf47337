pub mod appetite;
pub mod gap;
pub mod positions;
pub mod stress;

use chrono::{Local, NaiveDate};

/// Parse `--as-of`, defaulting to today's local date.
pub fn as_of_or_today(as_of: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match as_of {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| format!("Invalid --as-of '{}' (expected YYYY-MM-DD): {}", s, e).into()),
        None => Ok(Local::now().date_naive()),
    }
}
