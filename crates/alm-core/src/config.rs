//! Engine configuration: default bucket grid, deposit categories, liquidity
//! buffer horizon, optional FX table and log level.
//!
//! Loaded from YAML; `ALM_LOG_LEVEL` overrides the file's log level.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::AlmError;
use crate::gap::BucketBoundaries;
use crate::position::FxRates;
use crate::stress::scenario::DEFAULT_DEPOSIT_CATEGORY;
use crate::AlmResult;

pub const LOG_LEVEL_ENV: &str = "ALM_LOG_LEVEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = AlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(AlmError::InvalidInput {
                field: "log_level".into(),
                reason: format!("'{other}' is not one of trace, debug, info, warn, error"),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Boundaries used when a request does not supply its own.
    pub default_time_buckets: Vec<i64>,
    /// Liability categories subject to liquidity run-off.
    pub deposit_categories: Vec<String>,
    /// Leading buckets counted in the liquidity-buffer proxy.
    pub short_bucket_count: usize,
    /// When set, books are restated in `fx.reporting` before bucketing.
    pub fx: Option<FxRates>,
    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_time_buckets: vec![30, 90, 180, 365],
            deposit_categories: vec![DEFAULT_DEPOSIT_CATEGORY.to_string()],
            short_bucket_count: 1,
            fx: None,
            log_level: LogLevel::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> AlmResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> AlmResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| AlmError::InvalidInput {
            field: "config".into(),
            reason: format!("failed to read '{}': {e}", path.display()),
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Apply `ALM_LOG_LEVEL` if set.
    pub fn with_env_overrides(mut self) -> AlmResult<Self> {
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            self.log_level = level.parse()?;
        }
        Ok(self)
    }

    pub fn boundaries(&self) -> AlmResult<BucketBoundaries> {
        BucketBoundaries::new(self.default_time_buckets.clone())
    }

    pub fn validate(&self) -> AlmResult<()> {
        let boundaries = self.boundaries()?;
        if self.short_bucket_count == 0 || self.short_bucket_count > boundaries.bucket_count() {
            return Err(AlmError::InvalidInput {
                field: "short_bucket_count".into(),
                reason: format!(
                    "must be between 1 and {} for the default bucket grid",
                    boundaries.bucket_count()
                ),
            });
        }
        if let Some(fx) = &self.fx {
            if let Some((c, r)) = fx.rates.iter().find(|(_, r)| **r <= Decimal::ZERO) {
                return Err(AlmError::InvalidInput {
                    field: format!("fx.rates.{c}"),
                    reason: format!("FX rate must be positive (got {r})"),
                });
            }
        }
        Ok(())
    }
}
