use alm_core::engine;
use alm_core::repository::InMemoryRepository;
use alm_core::risk_appetite::{evaluate, AdverseDirection, BreachStatus, RiskAppetite};
use alm_core::stress::RiskType;
use alm_core::AlmError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn lcr(current: Decimal) -> RiskAppetite {
    RiskAppetite {
        risk_type: RiskType::Liquidity,
        metric_name: "LCR".to_string(),
        threshold_warning: dec!(1.1),
        threshold_critical: dec!(1.0),
        current_value: current,
        direction: AdverseDirection::LowerIsWorse,
        updated_at: None,
    }
}

fn nii_sensitivity(current: Decimal) -> RiskAppetite {
    RiskAppetite {
        risk_type: RiskType::InterestRate,
        metric_name: "NII Sensitivity to 100bp".to_string(),
        threshold_warning: dec!(10),
        threshold_critical: dec!(15),
        current_value: current,
        direction: AdverseDirection::HigherIsWorse,
        updated_at: None,
    }
}

// ===========================================================================
// Breach classification
// ===========================================================================

#[test]
fn test_lcr_breach_ladder() {
    assert_eq!(evaluate(&lcr(dec!(0.95))), BreachStatus::Critical);
    assert_eq!(evaluate(&lcr(dec!(1.05))), BreachStatus::Warning);
    assert_eq!(evaluate(&lcr(dec!(1.25))), BreachStatus::Ok);
}

#[test]
fn test_same_value_opposite_directions() {
    // 12 is a warning for a higher-is-worse metric...
    assert_eq!(evaluate(&nii_sensitivity(dec!(12))), BreachStatus::Warning);
    // ...and comfortably fine once the direction flips
    let mut flipped = nii_sensitivity(dec!(12));
    flipped.direction = AdverseDirection::LowerIsWorse;
    flipped.threshold_warning = dec!(10);
    flipped.threshold_critical = dec!(5);
    assert_eq!(evaluate(&flipped), BreachStatus::Ok);
}

// ===========================================================================
// Facade
// ===========================================================================

#[test]
fn test_evaluate_all_and_filtered() {
    let repo = InMemoryRepository::default()
        .with_appetite(lcr(dec!(0.95)))
        .with_appetite(nii_sensitivity(dec!(7.5)));

    let all = engine::evaluate_risk_appetite(&repo, None).unwrap();
    let statuses: Vec<BreachStatus> = all.result.iter().map(|a| a.status).collect();
    assert_eq!(statuses, vec![BreachStatus::Critical, BreachStatus::Ok]);
    assert_eq!(all.warnings.len(), 1);
    assert!(all.warnings[0].starts_with("LCR is CRITICAL"));

    let rates = engine::evaluate_risk_appetite(&repo, Some(&RiskType::InterestRate)).unwrap();
    assert_eq!(rates.result.len(), 1);
    assert_eq!(rates.result[0].appetite.metric_name, "NII Sensitivity to 100bp");
    assert_eq!(rates.result[0].headroom_to_warning, dec!(2.5));
}

#[test]
fn test_inconsistent_thresholds_rejected() {
    let mut bad = lcr(dec!(1.2));
    bad.threshold_critical = dec!(1.5);
    let repo = InMemoryRepository::default().with_appetite(bad);
    assert!(matches!(
        engine::evaluate_risk_appetite(&repo, None),
        Err(AlmError::InvalidInput { .. })
    ));
}

#[test]
fn test_appetite_from_json() {
    let json = r#"{
        "risk_appetite": [{
            "risk_type": "liquidity",
            "metric_name": "LCR",
            "threshold_warning": "1.1",
            "threshold_critical": "1.0",
            "current_value": "1.05",
            "direction": "LOWER_IS_WORSE",
            "updated_at": "2025-01-31T12:00:00Z"
        }]
    }"#;
    let repo = InMemoryRepository::from_json(json).unwrap();
    let out = engine::evaluate_risk_appetite(&repo, Some(&RiskType::Liquidity)).unwrap();
    assert_eq!(out.result[0].status, BreachStatus::Warning);
}
