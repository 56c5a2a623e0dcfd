//! Backend error bodies
//!
//! The backend reports failures in a few shapes:
//!
//! - `{"errors": [{"index": 1, "field": "so_tien", "message": "..."}]}`
//! - `{"detail": [{"loc": ["body", "records", 1, "so_tien"], "msg": "..."}]}`
//! - `{"detail": "..."}` or `{"message": "..."}`
//! - `[{"index": 1, "error": "..."}]`
//!
//! [`parse_issues`] folds all of them into [`ServerIssue`]s so nothing above
//! this crate ever looks at a raw body.

use core_kernel::ServerIssue;
use serde::Deserialize;
use serde_json::Value;

/// Path segments that locate the payload rather than a field
const LOCATION_ROOTS: [&str; 4] = ["body", "query", "path", "records"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Issues { errors: Vec<WireIssue> },
    Detail { detail: Detail },
    Message { message: String },
    Rows(Vec<RowError>),
}

#[derive(Debug, Deserialize)]
struct WireIssue {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    field: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Fields(Vec<FieldDetail>),
    Rows(Vec<RowError>),
    Text(String),
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct FieldDetail {
    #[serde(default)]
    loc: Vec<Value>,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct RowError {
    index: usize,
    error: String,
}

impl From<RowError> for ServerIssue {
    fn from(row: RowError) -> Self {
        ServerIssue::at_row(row.index, row.error)
    }
}

impl From<FieldDetail> for ServerIssue {
    fn from(detail: FieldDetail) -> Self {
        let index = detail
            .loc
            .iter()
            .rev()
            .find_map(Value::as_u64)
            .map(|i| i as usize);
        let field = detail
            .loc
            .iter()
            .rev()
            .filter_map(Value::as_str)
            .find(|segment| !LOCATION_ROOTS.contains(segment));
        let issue = ServerIssue {
            index,
            field: None,
            message: detail.msg,
        };
        match field {
            Some(field) => issue.with_field(field),
            None => issue,
        }
    }
}

/// Normalizes an error response body into issues
///
/// Blank bodies yield nothing; bodies that are not JSON become one general
/// issue carrying the text.
pub fn parse_issues(body: &str) -> Vec<ServerIssue> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<ErrorBody>(trimmed) {
        Ok(ErrorBody::Issues { errors }) => errors
            .into_iter()
            .map(|e| ServerIssue {
                index: e.index,
                field: e.field,
                message: e.message,
            })
            .collect(),
        Ok(ErrorBody::Detail { detail }) => match detail {
            Detail::Fields(fields) => fields.into_iter().map(ServerIssue::from).collect(),
            Detail::Rows(rows) => rows.into_iter().map(ServerIssue::from).collect(),
            Detail::Text(text) => vec![ServerIssue::general(text)],
            Detail::Other(value) => vec![ServerIssue::general(value.to_string())],
        },
        Ok(ErrorBody::Message { message }) => vec![ServerIssue::general(message)],
        Ok(ErrorBody::Rows(rows)) => rows.into_iter().map(ServerIssue::from).collect(),
        Err(_) => vec![ServerIssue::general(trimmed)],
    }
}
