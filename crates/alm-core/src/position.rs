//! Balance-sheet positions and the reporting-currency conversion step that
//! runs before aggregation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::AlmError;
use crate::types::{Currency, Money, Percent};
use crate::AlmResult;

/// Which side of the balance sheet a position sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Asset,
    Liability,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Asset => write!(f, "asset"),
            Side::Liability => write!(f, "liability"),
        }
    }
}

fn default_fixed_rate() -> bool {
    true
}

/// An asset or liability record as held by the position repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    #[serde(rename = "type")]
    pub side: Side,
    /// Free-form tag, e.g. "loans", "bonds", "deposits".
    pub category: String,
    pub amount: Money,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<NaiveDate>,
    /// Annual rate in percent (5.5 = 5.5%). For floating positions this is
    /// the reference rate subject to repricing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Percent>,
    #[serde(default = "default_fixed_rate")]
    pub fixed_rate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
}

impl Position {
    pub fn new(
        id: impl Into<String>,
        side: Side,
        category: impl Into<String>,
        amount: Money,
        currency: Currency,
    ) -> Self {
        Self {
            id: id.into(),
            side,
            category: category.into(),
            amount,
            currency,
            maturity_date: None,
            interest_rate: None,
            fixed_rate: true,
            counterparty: None,
        }
    }

    pub fn with_maturity(mut self, date: NaiveDate) -> Self {
        self.maturity_date = Some(date);
        self
    }

    pub fn with_rate(mut self, rate: Percent, fixed: bool) -> Self {
        self.interest_rate = Some(rate);
        self.fixed_rate = fixed;
        self
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = Some(counterparty.into());
        self
    }

    pub fn is_asset(&self) -> bool {
        self.side == Side::Asset
    }

    pub fn is_liability(&self) -> bool {
        self.side == Side::Liability
    }

    pub fn validate(&self) -> AlmResult<()> {
        if self.id.trim().is_empty() {
            return Err(AlmError::InvalidPosition {
                id: "<blank>".into(),
                reason: "position id must not be empty".into(),
            });
        }
        if self.amount < Decimal::ZERO {
            return Err(AlmError::InvalidPosition {
                id: self.id.clone(),
                reason: format!("amount must be non-negative (got {})", self.amount),
            });
        }
        Ok(())
    }
}

/// Validate every position in a book, failing on the first bad record.
pub fn validate_positions(positions: &[Position]) -> AlmResult<()> {
    positions.iter().try_for_each(Position::validate)
}

/// Distinct currencies present in a book, in declaration order.
pub fn currencies(positions: &[Position]) -> Vec<Currency> {
    let mut out: Vec<Currency> = positions.iter().map(|p| p.currency).collect();
    out.sort();
    out.dedup();
    out
}

/// Conversion table into a single reporting currency.
///
/// `rates[c]` is the number of reporting-currency units per one unit of `c`.
/// The reporting currency itself never needs an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FxRates {
    pub reporting: Currency,
    #[serde(default)]
    pub rates: BTreeMap<Currency, Decimal>,
}

impl FxRates {
    pub fn new(reporting: Currency) -> Self {
        Self {
            reporting,
            rates: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: Currency, rate: Decimal) -> Self {
        self.rates.insert(currency, rate);
        self
    }

    pub fn rate_for(&self, currency: Currency) -> AlmResult<Decimal> {
        if currency == self.reporting {
            return Ok(Decimal::ONE);
        }
        match self.rates.get(&currency) {
            Some(r) if *r > Decimal::ZERO => Ok(*r),
            Some(r) => Err(AlmError::InvalidInput {
                field: format!("fx_rates.{currency}"),
                reason: format!("FX rate must be positive (got {r})"),
            }),
            None => Err(AlmError::MissingFxRate {
                from: currency.to_string(),
                to: self.reporting.to_string(),
            }),
        }
    }
}

/// Return an independent copy of the book restated in the reporting currency.
pub fn convert_to_reporting(positions: &[Position], fx: &FxRates) -> AlmResult<Vec<Position>> {
    positions
        .iter()
        .map(|p| {
            let rate = fx.rate_for(p.currency)?;
            let amount = p.amount.checked_mul(rate).ok_or_else(|| AlmError::InvalidPosition {
                id: p.id.clone(),
                reason: format!("amount in {} exceeds the representable decimal range", fx.reporting),
            })?;
            Ok(Position {
                amount,
                currency: fx.reporting,
                ..p.clone()
            })
        })
        .collect()
}
