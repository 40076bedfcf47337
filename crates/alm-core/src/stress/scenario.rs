//! Stress scenarios and the transformations they apply to a position book.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AlmError;
use crate::position::{Position, Side};
use crate::types::{Currency, Rate};
use crate::AlmResult;

/// Category treated as deposits when no override is configured.
pub const DEFAULT_DEPOSIT_CATEGORY: &str = "deposits";

/// Risk family a scenario belongs to. Unknown tags deserialize into
/// `Other` and are rejected when the scenario is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskType {
    Market,
    Liquidity,
    Concentration,
    InterestRate,
    Other(String),
}

impl RiskType {
    pub fn as_str(&self) -> &str {
        match self {
            RiskType::Market => "market",
            RiskType::Liquidity => "liquidity",
            RiskType::Concentration => "concentration",
            RiskType::InterestRate => "interest_rate",
            RiskType::Other(s) => s,
        }
    }
}

impl From<&str> for RiskType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "market" => RiskType::Market,
            "liquidity" => RiskType::Liquidity,
            "concentration" => RiskType::Concentration,
            "interest_rate" => RiskType::InterestRate,
            _ => RiskType::Other(s.to_string()),
        }
    }
}

impl From<String> for RiskType {
    fn from(s: String) -> Self {
        RiskType::from(s.as_str())
    }
}

impl From<RiskType> for String {
    fn from(r: RiskType) -> Self {
        r.as_str().to_string()
    }
}

impl fmt::Display for RiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, parameterised adverse-condition simulation.
///
/// Parameter keys depend on the risk type:
/// - `interest_rate`: `shock` (parallel shift in percentage points)
/// - `liquidity`: `haircut`, `deposit_runoff` (fractions in `[0, 1]`)
/// - `market`: `haircut`, optional `category` / `currency` filters
/// - `concentration`: `counterparty`, optional `loss` (default 1.0)
///
/// Keys a rule does not recognise are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub risk_type: RiskType,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: String,
}

impl StressScenario {
    pub fn new(id: impl Into<String>, name: impl Into<String>, risk_type: RiskType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            risk_type,
            parameters: BTreeMap::new(),
            created_at: None,
            created_by: String::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    fn invalid(&self, key: &str, reason: impl Into<String>) -> AlmError {
        AlmError::InvalidParameter {
            scenario_id: self.id.clone(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Numeric parameter; accepts JSON numbers and numeric strings.
    pub fn decimal_param(&self, key: &str) -> AlmResult<Option<Decimal>> {
        let Some(value) = self.parameters.get(key) else {
            return Ok(None);
        };
        let text = match value {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Null => return Ok(None),
            other => return Err(self.invalid(key, format!("expected a number, got {other}"))),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map(Some)
            .map_err(|_| self.invalid(key, format!("'{text}' is not a decimal number")))
    }

    /// Numeric parameter constrained to `[0, 1]`.
    pub fn fraction_param(&self, key: &str) -> AlmResult<Option<Rate>> {
        match self.decimal_param(key)? {
            Some(f) if f < Decimal::ZERO || f > Decimal::ONE => {
                Err(self.invalid(key, format!("fraction must lie in [0, 1] (got {f})")))
            }
            other => Ok(other),
        }
    }

    pub fn str_param(&self, key: &str) -> AlmResult<Option<&str>> {
        match self.parameters.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.invalid(key, format!("expected a string, got {other}"))),
        }
    }

    /// Currency code parameter, matched case-insensitively.
    pub fn currency_param(&self, key: &str) -> AlmResult<Option<Currency>> {
        self.str_param(key)?
            .map(|code| {
                Currency::from_str(code).map_err(|e| self.invalid(key, e.to_string()))
            })
            .transpose()
    }
}

/// Transformed, independent copy of a book plus the ids the rule touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressedBook {
    pub positions: Vec<Position>,
    pub affected_assets: Vec<String>,
    pub affected_liabilities: Vec<String>,
}

impl StressedBook {
    fn record(&mut self, p: &Position) {
        let ids = match p.side {
            Side::Asset => &mut self.affected_assets,
            Side::Liability => &mut self.affected_liabilities,
        };
        if !ids.iter().any(|id| id == &p.id) {
            ids.push(p.id.clone());
        }
    }

    pub fn affected_count(&self) -> usize {
        self.affected_assets.len() + self.affected_liabilities.len()
    }
}

fn out_of_range(p: &Position, what: &str) -> AlmError {
    AlmError::InvalidPosition {
        id: p.id.clone(),
        reason: format!("{what} exceeds the representable decimal range"),
    }
}

fn markdown(p: &Position, fraction: Rate) -> AlmResult<Position> {
    let amount = p
        .amount
        .checked_mul(Decimal::ONE - fraction)
        .ok_or_else(|| out_of_range(p, "marked-down amount"))?;
    Ok(Position {
        amount,
        ..p.clone()
    })
}

/// Apply a scenario using the default deposit category.
pub fn apply_scenario(
    positions: &[Position],
    scenario: &StressScenario,
    as_of: NaiveDate,
) -> AlmResult<StressedBook> {
    apply_scenario_with(positions, scenario, as_of, &[DEFAULT_DEPOSIT_CATEGORY])
}

/// Apply a scenario's transformation rule to a copy of `positions`.
///
/// `deposit_categories` names the liability categories subject to liquidity
/// run-off (matched case-insensitively).
pub fn apply_scenario_with<S: AsRef<str>>(
    positions: &[Position],
    scenario: &StressScenario,
    as_of: NaiveDate,
    deposit_categories: &[S],
) -> AlmResult<StressedBook> {
    let mut book = StressedBook {
        positions: Vec::with_capacity(positions.len()),
        affected_assets: Vec::new(),
        affected_liabilities: Vec::new(),
    };

    match &scenario.risk_type {
        RiskType::InterestRate => {
            let shock = scenario.decimal_param("shock")?.unwrap_or(Decimal::ZERO);
            for p in positions {
                match p.interest_rate {
                    Some(rate) if !shock.is_zero() => {
                        let shocked = rate
                            .checked_add(shock)
                            .ok_or_else(|| out_of_range(p, "shocked interest rate"))?;
                        book.record(p);
                        book.positions.push(Position {
                            interest_rate: Some(shocked),
                            ..p.clone()
                        });
                    }
                    _ => book.positions.push(p.clone()),
                }
            }
        }
        RiskType::Liquidity => {
            let haircut = scenario.fraction_param("haircut")?.unwrap_or(Decimal::ZERO);
            let runoff = scenario
                .fraction_param("deposit_runoff")?
                .unwrap_or(Decimal::ZERO);
            let is_deposit = |p: &Position| {
                deposit_categories
                    .iter()
                    .any(|c| c.as_ref().eq_ignore_ascii_case(&p.category))
            };

            for p in positions {
                if p.is_asset() && !haircut.is_zero() {
                    book.record(p);
                    book.positions.push(markdown(p, haircut)?);
                } else if p.is_liability() && !runoff.is_zero() && is_deposit(p) {
                    book.record(p);
                    let withdrawn = p
                        .amount
                        .checked_mul(runoff)
                        .ok_or_else(|| out_of_range(p, "withdrawn amount"))?;
                    let remaining = p.amount - withdrawn;
                    book.positions.push(Position {
                        amount: withdrawn,
                        maturity_date: Some(as_of),
                        ..p.clone()
                    });
                    if remaining > Decimal::ZERO {
                        book.positions.push(Position {
                            amount: remaining,
                            ..p.clone()
                        });
                    }
                } else {
                    book.positions.push(p.clone());
                }
            }
        }
        RiskType::Market => {
            let haircut = scenario.fraction_param("haircut")?.unwrap_or(Decimal::ZERO);
            let category = scenario.str_param("category")?;
            let currency = scenario.currency_param("currency")?;
            for p in positions {
                let in_scope = p.is_asset()
                    && category.map_or(true, |c| c.eq_ignore_ascii_case(&p.category))
                    && currency.map_or(true, |c| c == p.currency);
                if in_scope && !haircut.is_zero() {
                    book.record(p);
                    book.positions.push(markdown(p, haircut)?);
                } else {
                    book.positions.push(p.clone());
                }
            }
        }
        RiskType::Concentration => {
            let counterparty = scenario.str_param("counterparty")?;
            let loss = scenario.fraction_param("loss")?.unwrap_or(Decimal::ONE);
            for p in positions {
                let exposed = p.is_asset()
                    && match (counterparty, p.counterparty.as_deref()) {
                        (Some(target), Some(cp)) => target.eq_ignore_ascii_case(cp),
                        _ => false,
                    };
                if exposed && !loss.is_zero() {
                    book.record(p);
                    book.positions.push(markdown(p, loss)?);
                } else {
                    book.positions.push(p.clone());
                }
            }
        }
        RiskType::Other(tag) => return Err(AlmError::UnsupportedRiskType(tag.clone())),
    }

    Ok(book)
}
