//! Risk appetite thresholds and breach classification.
//!
//! Whether a higher or a lower value is adverse is configured per metric
//! via [`AdverseDirection`]; it is never inferred from the metric name.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AlmError;
use crate::stress::scenario::RiskType;
use crate::AlmResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdverseDirection {
    /// e.g. LCR: falling below the threshold is a breach.
    LowerIsWorse,
    /// e.g. NII sensitivity: rising above the threshold is a breach.
    HigherIsWorse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreachStatus {
    Ok,
    Warning,
    Critical,
}

impl fmt::Display for BreachStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreachStatus::Ok => write!(f, "OK"),
            BreachStatus::Warning => write!(f, "WARNING"),
            BreachStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAppetite {
    pub risk_type: RiskType,
    pub metric_name: String,
    pub threshold_warning: Decimal,
    pub threshold_critical: Decimal,
    pub current_value: Decimal,
    pub direction: AdverseDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RiskAppetite {
    /// The warning threshold must sit on the safe side of the critical one.
    pub fn validate(&self) -> AlmResult<()> {
        let ordered = match self.direction {
            AdverseDirection::LowerIsWorse => self.threshold_warning >= self.threshold_critical,
            AdverseDirection::HigherIsWorse => self.threshold_warning <= self.threshold_critical,
        };
        if !ordered {
            return Err(AlmError::InvalidInput {
                field: format!("risk_appetite.{}", self.metric_name),
                reason: format!(
                    "warning threshold {} is beyond critical threshold {} for a {:?} metric",
                    self.threshold_warning, self.threshold_critical, self.direction
                ),
            });
        }
        Ok(())
    }

    /// Signed distance from the current value to `threshold`, positive
    /// while the value is on the safe side.
    pub fn headroom(&self, threshold: Decimal) -> Decimal {
        match self.direction {
            AdverseDirection::LowerIsWorse => self.current_value - threshold,
            AdverseDirection::HigherIsWorse => threshold - self.current_value,
        }
    }
}

/// Classify the current value against the thresholds. Touching a threshold
/// exactly is not a breach.
pub fn evaluate(appetite: &RiskAppetite) -> BreachStatus {
    if appetite.headroom(appetite.threshold_critical) < Decimal::ZERO {
        BreachStatus::Critical
    } else if appetite.headroom(appetite.threshold_warning) < Decimal::ZERO {
        BreachStatus::Warning
    } else {
        BreachStatus::Ok
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppetiteAssessment {
    pub appetite: RiskAppetite,
    pub status: BreachStatus,
    pub headroom_to_warning: Decimal,
    pub headroom_to_critical: Decimal,
}

impl AppetiteAssessment {
    pub fn assess(appetite: RiskAppetite) -> Self {
        let status = evaluate(&appetite);
        Self {
            headroom_to_warning: appetite.headroom(appetite.threshold_warning),
            headroom_to_critical: appetite.headroom(appetite.threshold_critical),
            status,
            appetite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lcr(current: Decimal) -> RiskAppetite {
        RiskAppetite {
            risk_type: RiskType::Liquidity,
            metric_name: "LCR".into(),
            threshold_warning: dec!(1.1),
            threshold_critical: dec!(1.0),
            current_value: current,
            direction: AdverseDirection::LowerIsWorse,
            updated_at: None,
        }
    }

    fn nii(current: Decimal) -> RiskAppetite {
        RiskAppetite {
            risk_type: RiskType::InterestRate,
            metric_name: "NII Sensitivity to 100bp".into(),
            threshold_warning: dec!(10),
            threshold_critical: dec!(15),
            current_value: current,
            direction: AdverseDirection::HigherIsWorse,
            updated_at: None,
        }
    }

    #[test]
    fn test_lcr_levels() {
        assert_eq!(evaluate(&lcr(dec!(0.95))), BreachStatus::Critical);
        assert_eq!(evaluate(&lcr(dec!(1.05))), BreachStatus::Warning);
        assert_eq!(evaluate(&lcr(dec!(1.25))), BreachStatus::Ok);
    }

    #[test]
    fn test_threshold_touch_is_not_breach() {
        assert_eq!(evaluate(&lcr(dec!(1.0))), BreachStatus::Warning);
        assert_eq!(evaluate(&lcr(dec!(1.1))), BreachStatus::Ok);
        assert_eq!(evaluate(&nii(dec!(15))), BreachStatus::Warning);
    }

    #[test]
    fn test_nii_levels() {
        assert_eq!(evaluate(&nii(dec!(7.5))), BreachStatus::Ok);
        assert_eq!(evaluate(&nii(dec!(12))), BreachStatus::Warning);
        assert_eq!(evaluate(&nii(dec!(16))), BreachStatus::Critical);
    }

    #[test]
    fn test_headroom_signs() {
        let a = AppetiteAssessment::assess(lcr(dec!(1.25)));
        assert_eq!(a.headroom_to_warning, dec!(0.15));
        assert_eq!(a.headroom_to_critical, dec!(0.25));
        let b = AppetiteAssessment::assess(nii(dec!(16)));
        assert_eq!(b.headroom_to_critical, dec!(-1));
        assert_eq!(b.status, BreachStatus::Critical);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut bad = lcr(dec!(1.2));
        bad.threshold_warning = dec!(0.9);
        assert!(bad.validate().is_err());
        assert!(nii(dec!(1)).validate().is_ok());
    }

    #[test]
    fn test_direction_serde() {
        let json = serde_json::to_string(&AdverseDirection::LowerIsWorse).unwrap();
        assert_eq!(json, "\"LOWER_IS_WORSE\"");
        let s: BreachStatus = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(s, BreachStatus::Critical);
    }
}
