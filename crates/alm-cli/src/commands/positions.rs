use clap::{Args, ValueEnum};
use serde_json::Value;

use alm_core::engine;
use alm_core::position::Side;

use crate::commands::as_of_or_today;
use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SideArg {
    Asset,
    Liability,
}

impl From<SideArg> for Side {
    fn from(s: SideArg) -> Self {
        match s {
            SideArg::Asset => Side::Asset,
            SideArg::Liability => Side::Liability,
        }
    }
}

/// Arguments for listing positions
#[derive(Args)]
pub struct PositionsArgs {
    /// Path to JSON book file (positions, scenarios, risk appetite)
    #[arg(long)]
    pub book: Option<String>,

    /// As-of date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub as_of: Option<String>,

    /// Restrict to assets or liabilities
    #[arg(long, value_enum)]
    pub side: Option<SideArg>,

    /// Restrict to one category (e.g. loans, deposits)
    #[arg(long)]
    pub category: Option<String>,
}

pub fn run_positions(args: PositionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let repo = input::load_repository(args.book.as_deref())?;
    let as_of = as_of_or_today(args.as_of.as_deref())?;
    let positions = engine::list_positions(
        &repo,
        as_of,
        args.side.map(Side::from),
        args.category.as_deref(),
    )?;
    Ok(serde_json::to_value(positions)?)
}
