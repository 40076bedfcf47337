//! Entry points for the service layer.
//!
//! Every call reads a fresh snapshot through the injected repository and
//! returns an independent result; nothing is cached between calls.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::AlmError;
use crate::gap::{bucket, compute_gap, BucketBoundaries, GapAnalysisResult, ScenarioDetails};
use crate::position::{convert_to_reporting, currencies, validate_positions, Position, Side};
use crate::repository::AlmRepository;
use crate::risk_appetite::{AppetiteAssessment, BreachStatus};
use crate::stress::impact::{summarize_impact, StressTestResult};
use crate::stress::scenario::{apply_scenario_with, RiskType, StressScenario};
use crate::types::{with_metadata, ComputationOutput};
use crate::AlmResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAnalysisRequest {
    pub as_of_date: NaiveDate,
    /// Falls back to the configured grid when absent.
    #[serde(default)]
    pub time_buckets: Option<Vec<i64>>,
    #[serde(default)]
    pub is_dynamic: bool,
    #[serde(default)]
    pub scenario_id: Option<String>,
}

fn resolve_scenario(repo: &dyn AlmRepository, scenario_id: &str) -> AlmResult<StressScenario> {
    repo.get_scenario(scenario_id)?
        .ok_or_else(|| AlmError::ScenarioNotFound(scenario_id.to_string()))
}

fn scenario_details(s: &StressScenario) -> ScenarioDetails {
    ScenarioDetails {
        scenario_id: s.id.clone(),
        name: s.name.clone(),
        risk_type: s.risk_type.clone(),
    }
}

/// Read, validate and (when an FX table is configured) restate the book.
fn load_book(
    repo: &dyn AlmRepository,
    as_of: NaiveDate,
    config: &EngineConfig,
    warnings: &mut Vec<String>,
) -> AlmResult<Vec<Position>> {
    let positions = repo.list_positions(as_of, None)?;
    validate_positions(&positions)?;
    debug!(count = positions.len(), %as_of, "loaded position book");

    if let Some(fx) = &config.fx {
        return convert_to_reporting(&positions, fx);
    }

    let present = currencies(&positions);
    if present.len() > 1 {
        let codes: Vec<&str> = present.iter().map(|c| c.code()).collect();
        let msg = format!(
            "Book mixes currencies ({}) and no FX table is configured; amounts are aggregated as stated.",
            codes.join(", ")
        );
        warn!("{msg}");
        warnings.push(msg);
    }
    Ok(positions)
}

fn note_undated(result: &GapAnalysisResult, warnings: &mut Vec<String>) {
    if result.undated_assets > Decimal::ZERO || result.undated_liabilities > Decimal::ZERO {
        warnings.push(format!(
            "Non-maturing positions excluded from buckets: assets {}, liabilities {}.",
            result.undated_assets, result.undated_liabilities
        ));
    }
}

/// Static or scenario-driven maturity gap analysis.
///
/// A dynamic request without a scenario id fails with `MissingScenario`; an
/// id that does not resolve fails with `ScenarioNotFound`. A scenario id on a
/// static request is still resolved and reported in `scenario_details`.
pub fn perform_gap_analysis(
    repo: &dyn AlmRepository,
    request: &GapAnalysisRequest,
    config: &EngineConfig,
) -> AlmResult<ComputationOutput<GapAnalysisResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let as_of = request.as_of_date;

    let boundaries = match &request.time_buckets {
        Some(days) => BucketBoundaries::new(days.clone())?,
        None => config.boundaries()?,
    };

    let scenario = match (&request.scenario_id, request.is_dynamic) {
        (None, true) => return Err(AlmError::MissingScenario),
        (None, false) => None,
        (Some(id), _) => Some(resolve_scenario(repo, id)?),
    };

    let positions = load_book(repo, as_of, config, &mut warnings)?;

    let mut result = match (&scenario, request.is_dynamic) {
        (Some(s), true) => {
            let stressed =
                apply_scenario_with(&positions, s, as_of, config.deposit_categories.as_slice())?;
            debug!(
                scenario = %s.id,
                affected = stressed.affected_count(),
                "scenario applied"
            );
            let mut r = compute_gap(&bucket(&stressed.positions, as_of, &boundaries)?)?;
            r.is_dynamic = true;
            r
        }
        _ => compute_gap(&bucket(&positions, as_of, &boundaries)?)?,
    };
    result.scenario_details = scenario.as_ref().map(scenario_details);

    if !request.is_dynamic && scenario.is_some() {
        warnings.push("Scenario id supplied on a static request; positions were not stressed.".into());
    }
    note_undated(&result, &mut warnings);

    info!(
        %as_of,
        buckets = result.buckets.len(),
        dynamic = result.is_dynamic,
        cumulative_gap = %result.final_cumulative_gap(),
        "gap analysis complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        if result.is_dynamic {
            "Maturity Gap Analysis (dynamic, scenario-stressed)"
        } else {
            "Maturity Gap Analysis (static)"
        },
        &serde_json::json!({
            "time_buckets": boundaries.as_slice(),
            "past_due": "clamped into the first bucket",
            "non_maturing": "reported separately as undated totals",
            "gap_ratio_base": "total dated assets",
            "fx_conversion": config.fx.as_ref().map(|fx| fx.reporting.code()),
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Run a stress scenario against the book as of `as_of`, using the
/// configured bucket grid.
pub fn run_stress_test(
    repo: &dyn AlmRepository,
    scenario_id: &str,
    as_of: NaiveDate,
    config: &EngineConfig,
) -> AlmResult<ComputationOutput<StressTestResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let scenario = resolve_scenario(repo, scenario_id)?;
    let boundaries = config.boundaries()?;
    let positions = load_book(repo, as_of, config, &mut warnings)?;

    let base = compute_gap(&bucket(&positions, as_of, &boundaries)?)?;
    let stressed_book =
        apply_scenario_with(&positions, &scenario, as_of, config.deposit_categories.as_slice())?;
    let mut stressed = compute_gap(&bucket(&stressed_book.positions, as_of, &boundaries)?)?;
    stressed.is_dynamic = true;

    let result = summarize_impact(
        &base,
        &stressed,
        &scenario,
        &stressed_book,
        config.short_bucket_count,
        Utc::now(),
    );

    for metric in &result.undefined_metrics {
        let msg = format!(
            "{metric} undefined: zero base with a non-zero stressed value, or a change beyond the decimal range."
        );
        warn!(scenario = %scenario.id, "{msg}");
        warnings.push(msg);
    }

    info!(
        scenario = %scenario.id,
        risk_type = %scenario.risk_type,
        affected = stressed_book.affected_count(),
        "stress test complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scenario Stress Test (relative impact vs base gap analysis)",
        &serde_json::json!({
            "scenario_id": scenario.id,
            "parameters": scenario.parameters,
            "time_buckets": boundaries.as_slice(),
            "short_bucket_count": config.short_bucket_count,
            "deposit_categories": config.deposit_categories,
            "impact_formula": "(stressed - base) / |base| * 100",
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Classify every risk appetite entry, optionally for one risk type.
pub fn evaluate_risk_appetite(
    repo: &dyn AlmRepository,
    risk_type: Option<&RiskType>,
) -> AlmResult<ComputationOutput<Vec<AppetiteAssessment>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let assessments = repo
        .list_risk_appetite(risk_type)?
        .into_iter()
        .map(|a| {
            a.validate()?;
            Ok(AppetiteAssessment::assess(a))
        })
        .collect::<AlmResult<Vec<_>>>()?;

    for a in assessments.iter().filter(|a| a.status != BreachStatus::Ok) {
        let msg = format!(
            "{} is {} (current {}, warning {}, critical {})",
            a.appetite.metric_name,
            a.status,
            a.appetite.current_value,
            a.appetite.threshold_warning,
            a.appetite.threshold_critical
        );
        warn!("{msg}");
        warnings.push(msg);
    }
    info!(count = assessments.len(), "risk appetite evaluated");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Risk Appetite Threshold Evaluation",
        &serde_json::json!({
            "risk_type_filter": risk_type.map(|r| r.to_string()),
            "breach_rule": "strictly beyond threshold in the configured adverse direction",
        }),
        warnings,
        elapsed,
        assessments,
    ))
}

/// Positions as of a date, optionally restricted to one side and category.
pub fn list_positions(
    repo: &dyn AlmRepository,
    as_of: NaiveDate,
    side: Option<Side>,
    category: Option<&str>,
) -> AlmResult<Vec<Position>> {
    let positions = repo.list_positions(as_of, category)?;
    Ok(positions
        .into_iter()
        .filter(|p| side.map_or(true, |s| p.side == s))
        .collect())
}

pub fn list_stress_scenarios(
    repo: &dyn AlmRepository,
    risk_type: Option<&RiskType>,
) -> AlmResult<Vec<StressScenario>> {
    repo.list_scenarios(risk_type)
}
