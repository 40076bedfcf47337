pub mod bucketing;
pub mod calculator;

pub use bucketing::{bucket, BucketBoundaries, BucketTotals, BucketedBook, TimeBucket};
pub use calculator::{compute_gap, GapAnalysisResult, GapBucket, ScenarioDetails};
