//! Error types for CAT calculations

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CatError>;

/// Errors raised by schedule generation, solving and tier table loading
#[derive(Debug, Error)]
pub enum CatError {
    /// Caller supplied parameters (or a cash-flow vector) that cannot describe a credit
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Tier table is empty or one of its rows is malformed
    #[error("Invalid tier table: {0}")]
    TierTable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CatError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        CatError::InvalidSchedule(reason.into())
    }
}
