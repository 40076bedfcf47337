use clap::Args;
use serde_json::Value;

use alm_core::config::EngineConfig;
use alm_core::engine::{self, GapAnalysisRequest};

use crate::commands::as_of_or_today;
use crate::input;

/// Arguments for gap analysis
#[derive(Args)]
pub struct GapArgs {
    /// Path to JSON book file (positions, scenarios, risk appetite)
    #[arg(long)]
    pub book: Option<String>,

    /// As-of date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub as_of: Option<String>,

    /// Bucket boundaries in days, comma separated (e.g. 30,90,180,365)
    #[arg(long, value_delimiter = ',')]
    pub buckets: Option<Vec<i64>>,

    /// Stress the book with --scenario before bucketing
    #[arg(long)]
    pub dynamic: bool,

    /// Scenario id (required with --dynamic)
    #[arg(long)]
    pub scenario: Option<String>,
}

pub fn run_gap_analysis(
    args: GapArgs,
    config: &EngineConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let repo = input::load_repository(args.book.as_deref())?;
    let request = GapAnalysisRequest {
        as_of_date: as_of_or_today(args.as_of.as_deref())?,
        time_buckets: args.buckets,
        is_dynamic: args.dynamic,
        scenario_id: args.scenario,
    };
    let result = engine::perform_gap_analysis(&repo, &request, config)?;
    Ok(serde_json::to_value(result)?)
}
