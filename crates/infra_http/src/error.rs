//! HTTP error types and the status mapping shared by every adapter

use core_kernel::{PortError, ServerIssue};
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

use crate::error_body::parse_issues;

/// Errors raised while setting up the client
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Message shown when the session has expired
pub const SESSION_EXPIRED: &str = "Phiên đăng nhập đã hết, vui lòng đăng nhập lại!";

/// Maps a non-success response to a port error
///
/// `path` names the resource for not-found errors; `body` is the raw response
/// body, normalized through [`parse_issues`].
pub fn status_to_port_error(status: StatusCode, path: &str, body: &str) -> PortError {
    let issues = parse_issues(body);
    match status {
        StatusCode::UNAUTHORIZED => PortError::unauthorized(SESSION_EXPIRED),
        StatusCode::FORBIDDEN => PortError::Forbidden {
            message: first_message(&issues).unwrap_or_else(|| path.to_string()),
        },
        StatusCode::NOT_FOUND => PortError::not_found("resource", path),
        s if s.is_server_error() && issues.iter().all(|i| i.index.is_none()) => {
            PortError::ServiceUnavailable {
                service: first_message(&issues)
                    .map(|m| format!("{} ({})", path, m))
                    .unwrap_or_else(|| format!("{} ({})", path, s)),
            }
        }
        s if issues.is_empty() => PortError::unprocessable(vec![ServerIssue::general(s.to_string())]),
        _ => PortError::unprocessable(issues),
    }
}

/// Maps a transport failure to a port error
pub fn transport_to_port_error(error: reqwest::Error, operation: &str, timeout: Duration) -> PortError {
    if error.is_timeout() {
        PortError::Timeout {
            operation: operation.to_string(),
            duration_ms: timeout.as_millis() as u64,
        }
    } else if error.is_decode() {
        PortError::Transformation {
            message: error.to_string(),
        }
    } else {
        PortError::Connection {
            message: format!("{} failed", operation),
            source: Some(Box::new(error)),
        }
    }
}

fn first_message(issues: &[ServerIssue]) -> Option<String> {
    issues.first().map(|i| i.message.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_from_any_endpoint() {
        let error = status_to_port_error(StatusCode::UNAUTHORIZED, "/hoa-don/", "");
        assert!(error.is_unauthorized());
    }

    #[test]
    fn test_unprocessable_keeps_field_issues() {
        let error = status_to_port_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "/hoa-don/",
            r#"{"detail":[{"loc":["body","ten_khach"],"msg":"field required"}]}"#,
        );
        assert_eq!(error.issues()[0].field.as_deref(), Some("ten_khach"));
    }

    #[test]
    fn test_server_error_with_row_issues_is_rejection() {
        let error = status_to_port_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "/hoa-don/batch-update",
            r#"[{"index": 1, "error": "X"}]"#,
        );
        assert_eq!(error.issues(), &[ServerIssue::at_row(1, "X")]);

        let plain = status_to_port_error(StatusCode::BAD_GATEWAY, "/hoa-don/", "");
        assert!(plain.is_transient());
    }

    #[test]
    fn test_bad_request_without_body() {
        let error = status_to_port_error(StatusCode::BAD_REQUEST, "/user/1", "");
        assert_eq!(error.issues().len(), 1);
        assert!(!error.is_transient());
    }
}
