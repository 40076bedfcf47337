//! Maturity bucketing: assigns each dated position to a day-offset bucket
//! measured from the as-of date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AlmError;
use crate::position::{validate_positions, Position, Side};
use crate::types::{add_checked, sub_checked, Money};
use crate::AlmResult;

/// Strictly increasing, non-negative day-count boundaries.
///
/// `n` boundaries define `n + 1` buckets: `[0, b0]`, `(b0, b1]`, ...,
/// `(b[n-1], ∞)`. Past-due positions are clamped into bucket 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct BucketBoundaries(Vec<i64>);

impl BucketBoundaries {
    pub fn new(days: Vec<i64>) -> AlmResult<Self> {
        if days.is_empty() {
            return Err(AlmError::InvalidBoundaries(
                "at least one boundary is required".into(),
            ));
        }
        if let Some(d) = days.iter().find(|d| **d < 0) {
            return Err(AlmError::InvalidBoundaries(format!(
                "boundaries must be non-negative day counts (got {d})"
            )));
        }
        if let Some(w) = days.windows(2).find(|w| w[1] <= w[0]) {
            return Err(AlmError::InvalidBoundaries(format!(
                "boundaries must be strictly increasing ({} followed by {})",
                w[0], w[1]
            )));
        }
        Ok(Self(days))
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Number of buckets including the beyond-horizon bucket.
    pub fn bucket_count(&self) -> usize {
        self.0.len() + 1
    }

    /// Smallest bucket whose upper boundary covers `offset_days`.
    pub fn index_for(&self, offset_days: i64) -> usize {
        let offset = offset_days.max(0);
        self.0
            .iter()
            .position(|upper| offset <= *upper)
            .unwrap_or(self.0.len())
    }

    pub fn buckets(&self) -> Vec<TimeBucket> {
        (0..self.bucket_count())
            .map(|index| {
                let lower_days = index.checked_sub(1).map(|i| self.0[i]);
                let upper_days = self.0.get(index).copied();
                let label = match (lower_days, upper_days) {
                    (None, Some(u)) => format!("0-{u}d"),
                    (Some(l), Some(u)) => format!("{}-{u}d", l + 1),
                    (Some(l), None) => format!(">{l}d"),
                    (None, None) => "all".to_string(),
                };
                TimeBucket {
                    index,
                    lower_days,
                    upper_days,
                    label,
                }
            })
            .collect()
    }
}

impl TryFrom<Vec<i64>> for BucketBoundaries {
    type Error = AlmError;

    fn try_from(days: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<BucketBoundaries> for Vec<i64> {
    fn from(b: BucketBoundaries) -> Self {
        b.0
    }
}

/// A day-offset interval from the as-of date. Lower bound exclusive, upper
/// bound inclusive; `None` means open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub index: usize,
    pub lower_days: Option<i64>,
    pub upper_days: Option<i64>,
    pub label: String,
}

/// Aggregated notional for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketTotals {
    pub bucket: TimeBucket,
    pub assets: Money,
    pub liabilities: Money,
    pub position_count: usize,
}

/// Output of the bucketing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketedBook {
    pub as_of_date: NaiveDate,
    pub boundaries: BucketBoundaries,
    pub buckets: Vec<BucketTotals>,
    /// Non-maturing positions are tracked here and never bucketed.
    pub undated_assets: Money,
    pub undated_liabilities: Money,
    pub undated_count: usize,
    /// Annual interest run-rate over every position carrying a rate,
    /// asset income minus liability expense.
    pub interest_run_rate: Money,
}

/// Days from `as_of` to `maturity`, negative when already matured.
pub fn offset_days(as_of: NaiveDate, maturity: NaiveDate) -> i64 {
    (maturity - as_of).num_days()
}

/// Partition a book into maturity buckets.
///
/// Amounts are summed as stated, with no FX conversion; callers pass a book
/// already restated in one reporting currency.
pub fn bucket(
    positions: &[Position],
    as_of: NaiveDate,
    boundaries: &BucketBoundaries,
) -> AlmResult<BucketedBook> {
    validate_positions(positions)?;

    let mut buckets: Vec<BucketTotals> = boundaries
        .buckets()
        .into_iter()
        .map(|bucket| BucketTotals {
            bucket,
            assets: Decimal::ZERO,
            liabilities: Decimal::ZERO,
            position_count: 0,
        })
        .collect();

    let mut undated_assets = Decimal::ZERO;
    let mut undated_liabilities = Decimal::ZERO;
    let mut undated_count = 0usize;
    let mut interest_run_rate = Decimal::ZERO;

    for p in positions {
        if let Some(rate) = p.interest_rate {
            let flow = (rate / Decimal::ONE_HUNDRED)
                .checked_mul(p.amount)
                .ok_or_else(|| AlmError::InvalidPosition {
                    id: p.id.clone(),
                    reason: "annual interest exceeds the representable decimal range".into(),
                })?;
            interest_run_rate = match p.side {
                Side::Asset => add_checked(interest_run_rate, flow, "interest_run_rate")?,
                Side::Liability => sub_checked(interest_run_rate, flow, "interest_run_rate")?,
            };
        }

        let Some(maturity) = p.maturity_date else {
            match p.side {
                Side::Asset => {
                    undated_assets = add_checked(undated_assets, p.amount, "undated_assets")?
                }
                Side::Liability => {
                    undated_liabilities =
                        add_checked(undated_liabilities, p.amount, "undated_liabilities")?
                }
            }
            undated_count += 1;
            continue;
        };

        let slot = &mut buckets[boundaries.index_for(offset_days(as_of, maturity))];
        match p.side {
            Side::Asset => slot.assets = add_checked(slot.assets, p.amount, "bucket_assets")?,
            Side::Liability => {
                slot.liabilities = add_checked(slot.liabilities, p.amount, "bucket_liabilities")?
            }
        }
        slot.position_count += 1;
    }

    Ok(BucketedBook {
        as_of_date: as_of,
        boundaries: boundaries.clone(),
        buckets,
        undated_assets,
        undated_liabilities,
        undated_count,
        interest_run_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Currency;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn standard() -> BucketBoundaries {
        BucketBoundaries::new(vec![30, 90, 180, 365]).unwrap()
    }

    fn dated(id: &str, side: Side, amount: Decimal, days: i64) -> Position {
        Position::new(id, side, "loans", amount, Currency::TND)
            .with_maturity(as_of() + Duration::days(days))
    }

    #[test]
    fn test_empty_boundaries_rejected() {
        assert!(matches!(
            BucketBoundaries::new(vec![]),
            Err(AlmError::InvalidBoundaries(_))
        ));
    }

    #[test]
    fn test_non_increasing_boundaries_rejected() {
        assert!(matches!(
            BucketBoundaries::new(vec![30, 30, 90]),
            Err(AlmError::InvalidBoundaries(_))
        ));
        assert!(matches!(
            BucketBoundaries::new(vec![90, 30]),
            Err(AlmError::InvalidBoundaries(_))
        ));
    }

    #[test]
    fn test_negative_boundary_rejected() {
        assert!(BucketBoundaries::new(vec![-5, 30]).is_err());
    }

    #[test]
    fn test_boundaries_deserialize_validated() {
        let ok: BucketBoundaries = serde_json::from_str("[30, 90]").unwrap();
        assert_eq!(ok.as_slice(), &[30, 90]);
        assert!(serde_json::from_str::<BucketBoundaries>("[90, 30]").is_err());
    }

    #[test]
    fn test_index_for_edges() {
        let b = standard();
        assert_eq!(b.index_for(-10), 0);
        assert_eq!(b.index_for(0), 0);
        assert_eq!(b.index_for(30), 0);
        assert_eq!(b.index_for(31), 1);
        assert_eq!(b.index_for(365), 3);
        assert_eq!(b.index_for(366), 4);
    }

    #[test]
    fn test_bucket_labels() {
        let labels: Vec<String> = standard().buckets().into_iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["0-30d", "31-90d", "91-180d", "181-365d", ">365d"]);
    }

    #[test]
    fn test_past_due_clamped_to_first_bucket() {
        let book = vec![dated("A1", Side::Asset, dec!(500), -45)];
        let out = bucket(&book, as_of(), &standard()).unwrap();
        assert_eq!(out.buckets[0].assets, dec!(500));
    }

    #[test]
    fn test_undated_tracked_separately() {
        let book = vec![
            Position::new("L1", Side::Liability, "deposits", dec!(700), Currency::TND),
            dated("A1", Side::Asset, dec!(100), 400),
        ];
        let out = bucket(&book, as_of(), &standard()).unwrap();
        assert_eq!(out.undated_liabilities, dec!(700));
        assert_eq!(out.undated_count, 1);
        assert_eq!(out.buckets[4].assets, dec!(100));
        let bucketed_liabs: Decimal = out.buckets.iter().map(|b| b.liabilities).sum();
        assert_eq!(bucketed_liabs, Decimal::ZERO);
    }

    #[test]
    fn test_negative_amount_fails() {
        let book = vec![dated("A1", Side::Asset, dec!(-1), 10)];
        assert!(matches!(
            bucket(&book, as_of(), &standard()),
            Err(AlmError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_interest_run_rate() {
        let book = vec![
            dated("A1", Side::Asset, dec!(1000), 10).with_rate(dec!(5), true),
            dated("L1", Side::Liability, dec!(800), 10).with_rate(dec!(2.5), true),
            dated("L2", Side::Liability, dec!(100), 10),
        ];
        let out = bucket(&book, as_of(), &standard()).unwrap();
        // 1000 * 5% - 800 * 2.5% = 50 - 20
        assert_eq!(out.interest_run_rate, dec!(30));
    }

    #[test]
    fn test_huge_amount_with_rate_does_not_overflow_run_rate() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let book = vec![dated("A1", Side::Asset, huge, 10).with_rate(dec!(5.5), true)];
        let out = bucket(&book, as_of(), &standard()).unwrap();
        assert_eq!(out.buckets[0].assets, huge);
        assert_eq!(
            out.interest_run_rate,
            Decimal::from_str_exact("2750000000000000000000000000").unwrap()
        );
    }

    #[test]
    fn test_bucket_total_overflow_is_an_error() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let book = vec![
            dated("A1", Side::Asset, huge, 10),
            dated("A2", Side::Asset, huge, 20),
        ];
        match bucket(&book, as_of(), &standard()) {
            Err(AlmError::InvalidInput { field, .. }) => assert_eq!(field, "bucket_assets"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_undated_total_overflow_is_an_error() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let book = vec![
            Position::new("L1", Side::Liability, "deposits", huge, Currency::TND),
            Position::new("L2", Side::Liability, "deposits", huge, Currency::TND),
        ];
        assert!(matches!(
            bucket(&book, as_of(), &standard()),
            Err(AlmError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_run_rate_overflow_names_position() {
        let book = vec![dated("A9", Side::Asset, Decimal::MAX, 10).with_rate(dec!(500), false)];
        match bucket(&book, as_of(), &standard()) {
            Err(AlmError::InvalidPosition { id, .. }) => assert_eq!(id, "A9"),
            other => panic!("expected InvalidPosition, got {other:?}"),
        }
    }
}
