use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AlmError;
use crate::AlmResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Fractions expressed as decimals (0.2 = 20%), e.g. haircuts and run-off.
pub type Rate = Decimal;

/// Values already scaled to percent (5.5 = 5.5%), e.g. interest rates and
/// impact metrics.
pub type Percent = Decimal;

/// Currencies carried by the position book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    TND,
    USD,
    EUR,
    GBP,
    AED,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::TND => "TND",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::AED => "AED",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = AlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TND" => Ok(Currency::TND),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "AED" => Ok(Currency::AED),
            other => Err(AlmError::InvalidInput {
                field: "currency".into(),
                reason: format!("unsupported currency code '{other}'"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Overflow-checked arithmetic
// ---------------------------------------------------------------------------

fn out_of_range(field: &str) -> AlmError {
    AlmError::InvalidInput {
        field: field.to_string(),
        reason: "value exceeds the representable decimal range".to_string(),
    }
}

/// `a + b`, or `InvalidInput` naming `field` on overflow.
pub fn add_checked(a: Money, b: Money, field: &str) -> AlmResult<Money> {
    a.checked_add(b).ok_or_else(|| out_of_range(field))
}

pub fn sub_checked(a: Money, b: Money, field: &str) -> AlmResult<Money> {
    a.checked_sub(b).ok_or_else(|| out_of_range(field))
}

/// Sum with overflow detection.
pub fn sum_checked<I>(values: I, field: &str) -> AlmResult<Money>
where
    I: IntoIterator<Item = Money>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| add_checked(acc, v, field))
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse_case_insensitive() {
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::EUR);
        assert_eq!(" AED ".parse::<Currency>().unwrap(), Currency::AED);
        assert!("JPY".parse::<Currency>().is_err());
    }

    #[test]
    fn test_checked_sum_reports_field_on_overflow() {
        let big = Decimal::MAX;
        match sum_checked([big, Decimal::ONE], "total_assets") {
            Err(AlmError::InvalidInput { field, .. }) => assert_eq!(field, "total_assets"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
        assert_eq!(
            sum_checked([Decimal::ONE, Decimal::from(2)], "x").unwrap(),
            Decimal::from(3)
        );
    }

    #[test]
    fn test_currency_serializes_as_code() {
        let json = serde_json::to_string(&Currency::TND).unwrap();
        assert_eq!(json, "\"TND\"");
    }
}
