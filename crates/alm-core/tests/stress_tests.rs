use alm_core::config::EngineConfig;
use alm_core::engine::{self, GapAnalysisRequest};
use alm_core::position::{Position, Side};
use alm_core::repository::InMemoryRepository;
use alm_core::stress::impact::{
    CUMULATIVE_GAP_IMPACT, LIQUIDITY_BUFFER_IMPACT, NII_IMPACT, SHORT_BUCKET_GAP_IMPACT,
};
use alm_core::stress::{RiskType, StressScenario};
use alm_core::{AlmError, Currency};
use chrono::{Duration, NaiveDate};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
}

fn days(n: i64) -> NaiveDate {
    as_of() + Duration::days(n)
}

fn bank() -> InMemoryRepository {
    InMemoryRepository::default()
        .with_positions([
            Position::new("A001", Side::Asset, "cash", dec!(300), Currency::TND)
                .with_maturity(days(1)),
            Position::new("A002", Side::Asset, "loans", dec!(900), Currency::TND)
                .with_maturity(days(400))
                .with_rate(dec!(8), false)
                .with_counterparty("Acme"),
            Position::new("L001", Side::Liability, "deposits", dec!(500), Currency::TND)
                .with_maturity(days(120))
                .with_rate(dec!(2), false),
            Position::new("L002", Side::Liability, "deposits", dec!(200), Currency::TND),
            Position::new("L003", Side::Liability, "borrowings", dec!(100), Currency::TND)
                .with_maturity(days(10))
                .with_rate(dec!(4), true),
        ])
        .with_scenario(
            StressScenario::new("S001", "Interest Rate Shock +200bp", RiskType::InterestRate)
                .with_param("shock", 2.0),
        )
        .with_scenario(
            StressScenario::new("S002", "Liquidity Stress", RiskType::Liquidity)
                .with_param("haircut", 0.3)
                .with_param("deposit_runoff", 0.2),
        )
        .with_scenario(StressScenario::new("S000", "Flat", RiskType::InterestRate).with_param("shock", 0))
        .with_scenario(StressScenario::new("S100", "Full Run", RiskType::Liquidity).with_param("deposit_runoff", 1.0))
        .with_scenario(StressScenario::new("S404", "Solar Flare", RiskType::Other("space_weather".into())))
}

fn gap_request(dynamic: bool, scenario: Option<&str>) -> GapAnalysisRequest {
    GapAnalysisRequest {
        as_of_date: as_of(),
        time_buckets: Some(vec![30, 90, 180, 365]),
        is_dynamic: dynamic,
        scenario_id: scenario.map(str::to_string),
    }
}

// ===========================================================================
// Stress test runs
// ===========================================================================

#[test]
fn test_rate_shock_stress_test() {
    let out = engine::run_stress_test(&bank(), "S001", as_of(), &EngineConfig::default()).unwrap();
    let r = &out.result;
    assert_eq!(r.scenario_id, "S001");
    // base NII: 900*8% - 500*2% - 100*4% = 72 - 10 - 4 = 58
    // stressed: 900*10% - 500*4% - 100*6% = 90 - 20 - 6 = 64
    assert_eq!(r.impact_metrics[NII_IMPACT], dec!(10.3448));
    assert_eq!(r.impact_metrics[SHORT_BUCKET_GAP_IMPACT], Decimal::ZERO);
    assert_eq!(r.impact_metrics[CUMULATIVE_GAP_IMPACT], Decimal::ZERO);
    assert_eq!(r.affected_assets, vec!["A002"]);
    assert_eq!(r.affected_liabilities, vec!["L001", "L003"]);
}

#[test]
fn test_liquidity_stress_test() {
    let out = engine::run_stress_test(&bank(), "S002", as_of(), &EngineConfig::default()).unwrap();
    let r = &out.result;
    // bucket 0 base: 300 - 100 = 200
    // stressed: 210 - (100 + 100 + 40) = -30
    assert_eq!(r.impact_metrics[SHORT_BUCKET_GAP_IMPACT], dec!(-115));
    // buffer 300/100 = 3 -> 210/240 = 0.875
    assert_eq!(r.impact_metrics[LIQUIDITY_BUFFER_IMPACT], dec!(-70.8333));
    // cumulative (dated only): base 1200 - 600 = 600; stressed 840 - 640 = 200
    assert_eq!(r.impact_metrics[CUMULATIVE_GAP_IMPACT], dec!(-66.6667));
    assert_eq!(r.affected_assets, vec!["A001", "A002"]);
    assert_eq!(r.affected_liabilities, vec!["L001", "L002"]);
    assert!(r.report_summary.starts_with("Stress test for scenario 'Liquidity Stress'"));
    assert!(r.report_summary.contains("severe"));
}

#[test]
fn test_stress_test_unknown_scenario() {
    let err = engine::run_stress_test(&bank(), "S999", as_of(), &EngineConfig::default()).unwrap_err();
    match err {
        AlmError::ScenarioNotFound(id) => assert_eq!(id, "S999"),
        other => panic!("expected ScenarioNotFound, got {other:?}"),
    }
}

#[test]
fn test_stress_test_unsupported_risk_type() {
    let err = engine::run_stress_test(&bank(), "S404", as_of(), &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, AlmError::UnsupportedRiskType(t) if t == "space_weather"));
}

// ===========================================================================
// Dynamic gap analysis
// ===========================================================================

#[test]
fn test_zero_shock_dynamic_equals_static() {
    let config = EngineConfig::default();
    let base = engine::perform_gap_analysis(&bank(), &gap_request(false, None), &config).unwrap();
    let dynamic =
        engine::perform_gap_analysis(&bank(), &gap_request(true, Some("S000")), &config).unwrap();
    assert_eq!(dynamic.result.buckets, base.result.buckets);
    assert_eq!(dynamic.result.interest_run_rate, base.result.interest_run_rate);
    assert_eq!(dynamic.result.undated_liabilities, base.result.undated_liabilities);
    assert!(dynamic.result.is_dynamic);
}

#[test]
fn test_full_runoff_moves_all_deposits_to_first_bucket() {
    let config = EngineConfig::default();
    let out =
        engine::perform_gap_analysis(&bank(), &gap_request(true, Some("S100")), &config).unwrap();
    let r = &out.result;
    // 500 + 200 deposits plus the 100 borrowing already in bucket 0
    assert_eq!(r.buckets[0].liabilities, dec!(800));
    assert_eq!(r.undated_liabilities, Decimal::ZERO);
    let later: Decimal = r.buckets[1..].iter().map(|b| b.liabilities).sum();
    assert_eq!(later, Decimal::ZERO);
}

#[test]
fn test_dynamic_without_scenario_id() {
    let err = engine::perform_gap_analysis(&bank(), &gap_request(true, None), &EngineConfig::default())
        .unwrap_err();
    assert!(matches!(err, AlmError::MissingScenario));
}

#[test]
fn test_scenario_catalogue_filter() {
    let liquidity = engine::list_stress_scenarios(&bank(), Some(&RiskType::Liquidity)).unwrap();
    let ids: Vec<&str> = liquidity.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["S002", "S100"]);
    assert_eq!(engine::list_stress_scenarios(&bank(), None).unwrap().len(), 5);
}
