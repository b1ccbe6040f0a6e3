pub mod error;
pub mod payment;
pub mod recast;
pub mod schedule;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenario;

#[cfg(feature = "export")]
pub mod export;

pub use error::RecastError;
pub use types::*;

/// Standard result type for all recast operations
pub type RecastResult<T> = Result<T, RecastError>;
