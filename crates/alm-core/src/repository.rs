//! The storage seam: the engine reads positions, scenarios and risk
//! appetite through [`AlmRepository`] and never owns that data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AlmError;

use crate::position::Position;
use crate::risk_appetite::RiskAppetite;
use crate::stress::scenario::{RiskType, StressScenario};
use crate::AlmResult;

/// Read-only access to the position book and its reference data.
///
/// Implementations backed by a database must serve each `list_positions`
/// call from a single point-in-time read.
pub trait AlmRepository {
    fn list_positions(
        &self,
        as_of: NaiveDate,
        category: Option<&str>,
    ) -> AlmResult<Vec<Position>>;

    fn get_scenario(&self, scenario_id: &str) -> AlmResult<Option<StressScenario>>;

    fn list_scenarios(&self, risk_type: Option<&RiskType>) -> AlmResult<Vec<StressScenario>>;

    fn list_risk_appetite(&self, risk_type: Option<&RiskType>) -> AlmResult<Vec<RiskAppetite>>;
}

/// Serialized form of a complete book, as exchanged in JSON files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub scenarios: Vec<StressScenario>,
    #[serde(default)]
    pub risk_appetite: Vec<RiskAppetite>,
}

/// Repository over an already materialised snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    snapshot: BookSnapshot,
}

impl InMemoryRepository {
    pub fn new(snapshot: BookSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json(json: &str) -> AlmResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Load a [`BookSnapshot`] JSON file. Read failures surface as
    /// `AlmError::Repository`.
    pub fn from_json_file(path: impl AsRef<Path>) -> AlmResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AlmError::Repository(format!("failed to read book '{}': {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    pub fn with_positions(mut self, positions: impl IntoIterator<Item = Position>) -> Self {
        self.snapshot.positions.extend(positions);
        self
    }

    pub fn with_scenario(mut self, scenario: StressScenario) -> Self {
        self.snapshot.scenarios.push(scenario);
        self
    }

    pub fn with_appetite(mut self, appetite: RiskAppetite) -> Self {
        self.snapshot.risk_appetite.push(appetite);
        self
    }

    pub fn snapshot(&self) -> &BookSnapshot {
        &self.snapshot
    }
}

impl AlmRepository for InMemoryRepository {
    /// The snapshot is a single as-of view, so `as_of` does not filter.
    fn list_positions(
        &self,
        _as_of: NaiveDate,
        category: Option<&str>,
    ) -> AlmResult<Vec<Position>> {
        Ok(self
            .snapshot
            .positions
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect())
    }

    fn get_scenario(&self, scenario_id: &str) -> AlmResult<Option<StressScenario>> {
        Ok(self
            .snapshot
            .scenarios
            .iter()
            .find(|s| s.id == scenario_id)
            .cloned())
    }

    fn list_scenarios(&self, risk_type: Option<&RiskType>) -> AlmResult<Vec<StressScenario>> {
        Ok(self
            .snapshot
            .scenarios
            .iter()
            .filter(|s| risk_type.map_or(true, |r| &s.risk_type == r))
            .cloned()
            .collect())
    }

    fn list_risk_appetite(&self, risk_type: Option<&RiskType>) -> AlmResult<Vec<RiskAppetite>> {
        Ok(self
            .snapshot
            .risk_appetite
            .iter()
            .filter(|a| risk_type.map_or(true, |r| &a.risk_type == r))
            .cloned()
            .collect())
    }
}
