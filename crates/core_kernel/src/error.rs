//! Kernel errors

use thiserror::Error;
use crate::money::MoneyError;
use crate::temporal::TemporalError;

/// Failures of the shared value types
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// A timezone name missing from the tz database
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid batch id: {0:?}")]
    InvalidBatchId(String),
}
