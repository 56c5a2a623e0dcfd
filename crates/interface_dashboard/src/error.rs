//! Console error handling
//!
//! Every screen returns [`DashboardError`]; [`DashboardError::user_message`]
//! turns it into the line shown to the operator.

use core_kernel::PortError;
use domain_access::AccessError;
use domain_invoice::InvoiceError;
use domain_report::ReportError;
use infra_http::HttpError;
use std::path::PathBuf;
use thiserror::Error;

/// Shown for failures the operator can only retry
pub const GENERIC_FAILURE: &str = "Có lỗi xảy ra, vui lòng thử lại!";

/// Console error types
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("Cannot read preferences at {path}: {source}")]
    Preferences {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write export to {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed preferences: {0}")]
    PreferencesFormat(#[from] serde_json::Error),

    /// Another call of the same kind is still running
    #[error("{0} is already in progress")]
    Busy(&'static str),

    #[error("No batch is open for editing")]
    NoEditSession,

    #[error("Batch {0} is not on the current page")]
    UnknownBatch(String),

    #[error("Logging already initialized: {0}")]
    Telemetry(String),
}

impl DashboardError {
    /// The port error behind this failure, if any
    pub fn port_error(&self) -> Option<&PortError> {
        match self {
            DashboardError::Port(e) => Some(e),
            DashboardError::Invoice(InvoiceError::Port(e)) => Some(e),
            DashboardError::Access(AccessError::Port(e)) => Some(e),
            DashboardError::Report(ReportError::Port(e)) => Some(e),
            _ => None,
        }
    }

    /// True when the session is gone and the operator must sign in again
    pub fn is_session_expired(&self) -> bool {
        self.port_error().is_some_and(PortError::is_unauthorized)
            || matches!(self, DashboardError::Access(AccessError::NotAuthenticated))
    }

    /// Operator-facing lines for this failure
    pub fn user_message(&self) -> Vec<String> {
        if let DashboardError::Invoice(InvoiceError::Invalid(report)) = self {
            return report.messages();
        }
        match self.port_error() {
            Some(PortError::Unprocessable { issues }) if !issues.is_empty() => {
                issues.iter().map(ToString::to_string).collect()
            }
            Some(PortError::Unauthorized { .. }) => vec![infra_http::error::SESSION_EXPIRED.to_string()],
            Some(e) if e.is_transient() => vec![GENERIC_FAILURE.to_string(), e.to_string()],
            Some(e) => vec![e.to_string()],
            None => vec![self.to_string()],
        }
    }
}
