//! Report domain errors

use core_kernel::{MoneyError, PortError, TemporalError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Unknown report granularity: {0}")]
    UnknownGranularity(String),

    #[error(transparent)]
    Range(#[from] TemporalError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Port(#[from] PortError),
}
