use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlmError {
    #[error("Invalid time bucket boundaries: {0}")]
    InvalidBoundaries(String),

    #[error("Invalid position {id}: {reason}")]
    InvalidPosition { id: String, reason: String },

    #[error("Stress scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Unsupported risk type: {0}")]
    UnsupportedRiskType(String),

    #[error("Dynamic gap analysis requires a scenario id")]
    MissingScenario,

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid parameter '{key}' in scenario {scenario_id}: {reason}")]
    InvalidParameter {
        scenario_id: String,
        key: String,
        reason: String,
    },

    #[error("No FX rate from {from} to reporting currency {to}")]
    MissingFxRate { from: String, to: String },

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for AlmError {
    fn from(e: serde_json::Error) -> Self {
        AlmError::SerializationError(e.to_string())
    }
}

impl From<serde_yaml::Error> for AlmError {
    fn from(e: serde_yaml::Error) -> Self {
        AlmError::SerializationError(e.to_string())
    }
}
