//! Per-bucket and cumulative gap over a bucketed book.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::gap::bucketing::BucketedBook;
use crate::stress::scenario::RiskType;
use crate::error::AlmError;
use crate::types::{add_checked, sub_checked, sum_checked, Money};
use crate::AlmResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapBucket {
    pub bucket: String,
    pub lower_days: Option<i64>,
    pub upper_days: Option<i64>,
    pub assets: Money,
    pub liabilities: Money,
    pub gap: Money,
    pub gap_ratio: Decimal,
    pub cumulative_gap: Money,
    pub cumulative_gap_ratio: Decimal,
}

/// Identifies the scenario a dynamic result was produced under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDetails {
    pub scenario_id: String,
    pub name: String,
    pub risk_type: RiskType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysisResult {
    pub as_of_date: NaiveDate,
    pub time_buckets: Vec<i64>,
    /// In ascending maturity order; the last entry is beyond the horizon.
    pub buckets: Vec<GapBucket>,
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub undated_assets: Money,
    pub undated_liabilities: Money,
    pub interest_run_rate: Money,
    pub is_dynamic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_details: Option<ScenarioDetails>,
}

impl GapAnalysisResult {
    pub fn gaps(&self) -> Vec<Money> {
        self.buckets.iter().map(|b| b.gap).collect()
    }

    pub fn cumulative_gaps(&self) -> Vec<Money> {
        self.buckets.iter().map(|b| b.cumulative_gap).collect()
    }

    /// Gap in the shortest-maturity bucket.
    pub fn shortest_gap(&self) -> Money {
        self.buckets.first().map(|b| b.gap).unwrap_or_default()
    }

    /// Cumulative gap through the beyond-horizon bucket.
    pub fn final_cumulative_gap(&self) -> Money {
        self.buckets
            .last()
            .map(|b| b.cumulative_gap)
            .unwrap_or_default()
    }

    /// Assets over liabilities across the first `short_buckets` buckets.
    /// `None` when those buckets hold no liabilities.
    pub fn liquidity_buffer(&self, short_buckets: usize) -> Option<Decimal> {
        let n = short_buckets.clamp(1, self.buckets.len().max(1));
        let (assets, liabilities) = self
            .buckets
            .iter()
            .take(n)
            .try_fold((Decimal::ZERO, Decimal::ZERO), |(a, l), b| {
                Some((a.checked_add(b.assets)?, l.checked_add(b.liabilities)?))
            })?;
        if liabilities.is_zero() {
            None
        } else {
            assets.checked_div(liabilities)
        }
    }
}

/// Compute gap = assets − liabilities per bucket and the running cumulative
/// gap in ascending maturity order. Ratios are against total dated assets.
///
/// Totals that leave the decimal range fail with `InvalidInput`.
pub fn compute_gap(bucketed: &BucketedBook) -> AlmResult<GapAnalysisResult> {
    let total_assets = sum_checked(bucketed.buckets.iter().map(|b| b.assets), "total_assets")?;
    let total_liabilities = sum_checked(
        bucketed.buckets.iter().map(|b| b.liabilities),
        "total_liabilities",
    )?;

    let ratio = |v: Money, field: &str| -> AlmResult<Decimal> {
        if total_assets > Decimal::ZERO {
            v.checked_div(total_assets).ok_or_else(|| AlmError::InvalidInput {
                field: field.to_string(),
                reason: "ratio to total assets exceeds the representable decimal range".into(),
            })
        } else {
            Ok(Decimal::ZERO)
        }
    };

    let mut running = Decimal::ZERO;
    let mut buckets = Vec::with_capacity(bucketed.buckets.len());
    for bt in &bucketed.buckets {
        let gap = sub_checked(bt.assets, bt.liabilities, "gap")?;
        running = add_checked(running, gap, "cumulative_gap")?;
        buckets.push(GapBucket {
            bucket: bt.bucket.label.clone(),
            lower_days: bt.bucket.lower_days,
            upper_days: bt.bucket.upper_days,
            assets: bt.assets,
            liabilities: bt.liabilities,
            gap,
            gap_ratio: ratio(gap, "gap_ratio")?,
            cumulative_gap: running,
            cumulative_gap_ratio: ratio(running, "cumulative_gap_ratio")?,
        });
    }

    Ok(GapAnalysisResult {
        as_of_date: bucketed.as_of_date,
        time_buckets: bucketed.boundaries.as_slice().to_vec(),
        buckets,
        total_assets,
        total_liabilities,
        undated_assets: bucketed.undated_assets,
        undated_liabilities: bucketed.undated_liabilities,
        interest_run_rate: bucketed.interest_run_rate,
        is_dynamic: false,
        scenario_details: None,
    })
}
