//! Relative-impact metrics comparing a stressed gap analysis to the base.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::gap::GapAnalysisResult;
use crate::stress::scenario::{RiskType, StressScenario, StressedBook};
use crate::types::Percent;

pub const SHORT_BUCKET_GAP_IMPACT: &str = "short_bucket_gap_impact_pct";
pub const CUMULATIVE_GAP_IMPACT: &str = "cumulative_gap_impact_pct";
pub const LIQUIDITY_BUFFER_IMPACT: &str = "liquidity_buffer_impact_pct";
pub const NII_IMPACT: &str = "nii_impact_pct";

/// Worst-metric cut-offs (in percent) for the summary wording.
const LIMITED_IMPACT_FLOOR: Decimal = dec!(-5);
const MODERATE_IMPACT_FLOOR: Decimal = dec!(-15);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestResult {
    pub scenario_id: String,
    pub scenario_name: String,
    pub risk_type: RiskType,
    pub as_of_date: NaiveDate,
    pub run_date: DateTime<Utc>,
    /// Metric name -> signed change in percent of the base value.
    pub impact_metrics: BTreeMap<String, Percent>,
    /// Metrics with no defined relative change: zero base and non-zero
    /// stressed value, or a change outside the decimal range.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undefined_metrics: Vec<String>,
    pub affected_assets: Vec<String>,
    pub affected_liabilities: Vec<String>,
    pub report_summary: String,
}

/// `(stressed − base) / |base|` in percent, rounded to 4 dp.
///
/// A zero base is only defined when the stressed value is also zero. A change
/// too large for the decimal range is undefined as well.
pub fn relative_change_pct(base: Decimal, stressed: Decimal) -> Option<Percent> {
    if base.is_zero() {
        return stressed.is_zero().then_some(Decimal::ZERO);
    }
    let change = stressed
        .checked_sub(base)?
        .checked_div(base.abs())?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    Some(change.round_dp(4))
}

fn severity(worst: Percent) -> &'static str {
    if worst >= LIMITED_IMPACT_FLOOR {
        "limited"
    } else if worst >= MODERATE_IMPACT_FLOOR {
        "moderate"
    } else {
        "severe"
    }
}

/// Compare base and stressed results and assemble the stress-test report.
///
/// `short_buckets` is the number of leading buckets used for the
/// liquidity-buffer proxy.
pub fn summarize_impact(
    base: &GapAnalysisResult,
    stressed: &GapAnalysisResult,
    scenario: &StressScenario,
    book: &StressedBook,
    short_buckets: usize,
    run_date: DateTime<Utc>,
) -> StressTestResult {
    let mut impact_metrics = BTreeMap::new();
    let mut undefined_metrics = Vec::new();

    let mut put = |name: &str, change: Option<Percent>| match change {
        Some(v) => {
            impact_metrics.insert(name.to_string(), v);
        }
        None => undefined_metrics.push(name.to_string()),
    };

    put(
        SHORT_BUCKET_GAP_IMPACT,
        relative_change_pct(base.shortest_gap(), stressed.shortest_gap()),
    );
    put(
        CUMULATIVE_GAP_IMPACT,
        relative_change_pct(base.final_cumulative_gap(), stressed.final_cumulative_gap()),
    );
    put(
        LIQUIDITY_BUFFER_IMPACT,
        match (
            base.liquidity_buffer(short_buckets),
            stressed.liquidity_buffer(short_buckets),
        ) {
            (Some(b), Some(s)) => relative_change_pct(b, s),
            _ => None,
        },
    );
    put(
        NII_IMPACT,
        relative_change_pct(base.interest_run_rate, stressed.interest_run_rate),
    );

    let worst = impact_metrics
        .values()
        .copied()
        .min()
        .unwrap_or(Decimal::ZERO);

    let mut headline: Vec<String> = [CUMULATIVE_GAP_IMPACT, LIQUIDITY_BUFFER_IMPACT, NII_IMPACT]
        .iter()
        .filter_map(|k| {
            impact_metrics
                .get(*k)
                .map(|v| format!("{} {}%", k.trim_end_matches("_impact_pct").replace('_', " "), v))
        })
        .collect();
    if headline.is_empty() {
        headline.push("no measurable metric change".to_string());
    }

    let report_summary = format!(
        "Stress test for scenario '{}' ({}) as of {} shows {} impact: {}. {} asset(s) and {} liability position(s) affected.",
        scenario.name,
        scenario.risk_type,
        base.as_of_date,
        severity(worst),
        headline.join(", "),
        book.affected_assets.len(),
        book.affected_liabilities.len(),
    );

    StressTestResult {
        scenario_id: scenario.id.clone(),
        scenario_name: scenario.name.clone(),
        risk_type: scenario.risk_type.clone(),
        as_of_date: base.as_of_date,
        run_date,
        impact_metrics,
        undefined_metrics,
        affected_assets: book.affected_assets.clone(),
        affected_liabilities: book.affected_liabilities.clone(),
        report_summary,
    }
}
