use clap::Args;
use serde_json::Value;

use alm_core::engine;
use alm_core::stress::RiskType;

use crate::input;

/// Arguments for risk appetite evaluation
#[derive(Args)]
pub struct RiskAppetiteArgs {
    /// Path to JSON book file (positions, scenarios, risk appetite)
    #[arg(long)]
    pub book: Option<String>,

    /// Filter by risk type: market, liquidity, concentration, interest_rate
    #[arg(long)]
    pub risk_type: Option<String>,
}

pub fn run_risk_appetite(args: RiskAppetiteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let repo = input::load_repository(args.book.as_deref())?;
    let risk_type = args.risk_type.as_deref().map(RiskType::from);
    let result = engine::evaluate_risk_appetite(&repo, risk_type.as_ref())?;
    Ok(serde_json::to_value(result)?)
}
