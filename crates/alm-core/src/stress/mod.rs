pub mod impact;
pub mod scenario;

pub use impact::{relative_change_pct, summarize_impact, StressTestResult};
pub use scenario::{apply_scenario, apply_scenario_with, RiskType, StressScenario, StressedBook};
