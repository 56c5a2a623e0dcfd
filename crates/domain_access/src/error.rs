//! Access domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the access domain
#[derive(Debug, Error)]
pub enum AccessError {
    /// A role name the console does not know
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    /// A user payload failed local validation; nothing was sent
    #[error("Invalid user data: {0}")]
    InvalidUser(String),

    /// No signed-in session
    #[error("Not signed in")]
    NotAuthenticated,

    /// Signed in without the required permission
    #[error("Missing permission: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl From<validator::ValidationErrors> for AccessError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let codes: Vec<String> = errs.iter().map(|e| e.code.to_string()).collect();
                format!("{} ({})", field, codes.join(", "))
            })
            .collect();
        fields.sort();
        AccessError::InvalidUser(fields.join("; "))
    }
}
