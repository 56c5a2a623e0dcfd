//! Invoice domain errors

use core_kernel::{CoreError, MoneyError, PortError, Vnd};
use thiserror::Error;

use crate::validation::ValidationReport;

/// Errors that can occur in the invoice domain
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// A typed value of the wrong kind was written to a field
    #[error("Field {field} expects {expected}, got {found}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Operator input could not be read for a field
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A row index outside the batch being edited
    #[error("Row {0} does not exist")]
    RowOutOfRange(usize),

    /// The batch failed local validation; nothing was sent
    #[error("Batch has {} invalid row(s)", .0.errors.len())]
    Invalid(ValidationReport),

    /// The operation is not allowed in the current editor state
    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    /// The batch's fees add up to more than its amounts
    #[error("Fees ({fees}) exceed amounts ({amounts}); transfer-out would be negative")]
    NegativeTransferOut { amounts: Vnd, fees: Vnd },

    /// A save is already in flight for this session
    #[error("A save is already in progress")]
    SaveInProgress,

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl InvoiceError {
    pub fn invalid_state(action: &'static str, state: &'static str) -> Self {
        InvoiceError::InvalidState { action, state }
    }
}
