use clap::Args;
use serde_json::Value;

use alm_core::config::EngineConfig;
use alm_core::engine;
use alm_core::stress::RiskType;

use crate::commands::as_of_or_today;
use crate::input;

/// Arguments for running a stress test
#[derive(Args)]
pub struct StressTestArgs {
    /// Path to JSON book file (positions, scenarios, risk appetite)
    #[arg(long)]
    pub book: Option<String>,

    /// Scenario id to run (e.g. S001)
    #[arg(long)]
    pub scenario: String,

    /// As-of date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Arguments for listing stress scenarios
#[derive(Args)]
pub struct ScenariosArgs {
    /// Path to JSON book file (positions, scenarios, risk appetite)
    #[arg(long)]
    pub book: Option<String>,

    /// Filter by risk type: market, liquidity, concentration, interest_rate
    #[arg(long)]
    pub risk_type: Option<String>,
}

pub fn run_stress_test(
    args: StressTestArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let repo = input::load_repository(args.book.as_deref())?;
    let as_of = as_of_or_today(args.as_of.as_deref())?;
    let result = engine::run_stress_test(&repo, &args.scenario, as_of, config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let repo = input::load_repository(args.book.as_deref())?;
    let risk_type = args.risk_type.as_deref().map(RiskType::from);
    let scenarios = engine::list_stress_scenarios(&repo, risk_type.as_ref())?;
    Ok(serde_json::to_value(scenarios)?)
}
