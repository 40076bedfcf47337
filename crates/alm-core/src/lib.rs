pub mod config;
pub mod engine;
pub mod error;
pub mod gap;
pub mod position;
pub mod repository;
pub mod risk_appetite;
pub mod stress;
pub mod types;

pub use error::AlmError;
pub use types::*;

/// Standard result type for all ALM engine operations
pub type AlmResult<T> = Result<T, AlmError>;
