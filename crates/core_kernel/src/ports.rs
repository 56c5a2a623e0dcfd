//! Ports and Adapters Infrastructure
//!
//! Every domain crate defines its port traits against [`PortError`] and
//! [`DomainPort`]; the HTTP adapter and the in-memory mocks implement them.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        Application Layer (dashboards)         │
//! └──────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │  Port Traits (InvoicePort, AccessPort, ...)   │
//! └──────────────────────────────────────────────┘
//!             ▲                        ▲
//!   ┌─────────┴─────────┐    ┌─────────┴────────┐
//!   │   HTTP adapter    │    │  In-memory mock   │
//!   │   (infra_http)    │    │   (tests)         │
//!   └───────────────────┘    └──────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One problem reported by the backend
///
/// `index` points into the submitted array for bulk calls; `field` names the
/// offending wire field when the backend says which one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerIssue {
    pub index: Option<usize>,
    pub field: Option<String>,
    pub message: String,
}

impl ServerIssue {
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            index: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn at_row(index: usize, message: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            field: None,
            message: message.into(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for ServerIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.index, &self.field) {
            (Some(i), Some(field)) => write!(f, "row {}: {}: {}", i + 1, field, self.message),
            (Some(i), None) => write!(f, "row {}: {}", i + 1, self.message),
            (None, Some(field)) => write!(f, "{}: {}", field, self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

/// Error type for port operations
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    /// The request was rejected before it reached the backend
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// The backend rejected the payload (HTTP 422 or a failed bulk call)
    #[error("Request rejected: {}", summarize(.issues))]
    Unprocessable { issues: Vec<ServerIssue> },

    /// The session is missing or expired; the operator must sign in again
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Signed in, but not allowed to do this
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Connection to the backend failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// The backend answered with a server error
    #[error("Service unavailable: {service}")]
    ServiceUnavailable { service: String },

    /// A response body could not be decoded
    #[error("Transformation error: {message}")]
    Transformation { message: String },
}

fn summarize(issues: &[ServerIssue]) -> String {
    match issues {
        [] => "no details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn unprocessable(issues: Vec<ServerIssue>) -> Self {
        PortError::Unprocessable { issues }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        PortError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Returns true if the session has ended and the operator must sign in
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PortError::Unauthorized { .. })
    }

    /// Backend-reported issues, if this error carries any
    pub fn issues(&self) -> &[ServerIssue] {
        match self {
            PortError::Unprocessable { issues } => issues,
            _ => &[],
        }
    }
}

/// Marker trait for all domain ports
///
/// All port traits extend this marker so they are thread-safe and usable
/// from async contexts.
pub trait DomainPort: Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("CardInvoice", 123);
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("CardInvoice"));
    }

    #[test]
    fn test_port_error_transient() {
        let timeout = PortError::Timeout {
            operation: "bulk_upsert".to_string(),
            duration_ms: 60_000,
        };
        assert!(timeout.is_transient());
        assert!(!PortError::unauthorized("expired").is_transient());
    }

    #[test]
    fn test_unprocessable_display_summarizes_issues() {
        let error = PortError::unprocessable(vec![
            ServerIssue::at_row(1, "duplicate"),
            ServerIssue::general("bad"),
        ]);
        assert_eq!(error.issues().len(), 2);
        assert_eq!(
            error.to_string(),
            "Request rejected: row 2: duplicate (and 1 more)"
        );
    }
}
