mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use alm_core::config::{EngineConfig, LogLevel};

use commands::appetite::RiskAppetiteArgs;
use commands::gap::GapArgs;
use commands::positions::PositionsArgs;
use commands::stress::{ScenariosArgs, StressTestArgs};

/// Asset-liability gap analysis, stress testing and risk appetite checks
#[derive(Parser)]
#[command(
    name = "alm",
    version,
    about = "Asset-liability gap analysis, stress testing and risk appetite checks",
    long_about = "A CLI for bank balance-sheet analytics with decimal precision. \
                  Buckets assets and liabilities by residual maturity, runs \
                  interest-rate, liquidity, market and concentration stress scenarios, \
                  and evaluates risk appetite thresholds."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides config and ALM_LOG_LEVEL
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List positions on the book
    Positions(PositionsArgs),
    /// Bucket the book by residual maturity and compute gaps
    GapAnalysis(GapArgs),
    /// Run a stress scenario against the book
    StressTest(StressTestArgs),
    /// List stress scenarios
    Scenarios(ScenariosArgs),
    /// Evaluate risk appetite thresholds
    RiskAppetite(RiskAppetiteArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn load_config(cli: &Cli) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_yaml_file(input::file::resolve_path(path)?)?,
        None => EngineConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.parse::<LogLevel>()?;
    }
    Ok(config)
}

/// Logs go to stderr so that stdout stays machine readable. `RUST_LOG`
/// takes precedence over the configured level.
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("alm {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };
    init_tracing(config.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Positions(args) => commands::positions::run_positions(args),
        Commands::GapAnalysis(args) => commands::gap::run_gap_analysis(args, &config),
        Commands::StressTest(args) => commands::stress::run_stress_test(args, &config),
        Commands::Scenarios(args) => commands::stress::run_scenarios(args),
        Commands::RiskAppetite(args) => commands::appetite::run_risk_appetite(args),
        Commands::Version => return,
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
