//! User accounts and the signed-in identity

use chrono::{DateTime, Utc};
use core_kernel::temporal::wire_timestamp;
use core_kernel::UserId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AccessError;
use crate::permission::{PermissionSet, Role};

pub const MIN_PASSWORD_LENGTH: u64 = 6;

/// A console account as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, with = "wire_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "wire_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// The account's role, if it is one the console knows
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }
}

/// Payload for creating an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub role: Role,
}

impl NewUser {
    /// Runs the local checks; nothing should be sent when this fails
    pub fn check(&self) -> Result<(), AccessError> {
        self.validate()?;
        if self.username.trim().is_empty() {
            return Err(AccessError::InvalidUser("username (length)".to_string()));
        }
        Ok(())
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6))]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub fn check(&self) -> Result<(), AccessError> {
        self.validate()?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &UserUpdate::default()
    }
}

/// A permission known to the backend, as listed by `/user/permissions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionInfo {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Who is signed in and what they may do, from `/user/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: PermissionSet,
    #[serde(default)]
    pub is_active: bool,
}

impl SessionIdentity {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.has(permission)
    }

    pub fn has_any(&self, permissions: &[&str]) -> bool {
        self.permissions.has_any(permissions)
    }

    pub fn has_all(&self, permissions: &[&str]) -> bool {
        self.permissions.has_all(permissions)
    }

    /// Known roles from both the single `role` and the `roles` list
    pub fn roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self
            .role
            .iter()
            .chain(self.roles.iter())
            .filter_map(|r| r.parse().ok())
            .collect();
        roles.sort();
        roles.dedup();
        roles
    }

    pub fn is_admin(&self) -> bool {
        self.roles().contains(&Role::Admin)
    }

    /// Fails with [`AccessError::PermissionDenied`] unless the permission is held
    pub fn require(&self, permission: &str) -> Result<(), AccessError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AccessError::PermissionDenied(permission.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{BILL_CREATE, BILL_VIEW};

    fn new_user() -> NewUser {
        NewUser {
            username: "lan".into(),
            email: "lan@example.com".into(),
            name: "Lan".into(),
            password: "secret1".into(),
            role: Role::User,
        }
    }

    #[test]
    fn test_valid_new_user_passes() {
        assert!(new_user().check().is_ok());
    }

    #[test]
    fn test_bad_email_and_short_password_rejected() {
        let user = NewUser {
            email: "not-an-email".into(),
            password: "123".into(),
            ..new_user()
        };
        match user.check() {
            Err(AccessError::InvalidUser(msg)) => {
                assert!(msg.contains("email"));
                assert!(msg.contains("password"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_blank_username_rejected() {
        let user = NewUser {
            username: "   ".into(),
            ..new_user()
        };
        assert!(user.check().is_err());
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let update = UserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"is_active":false}"#);
        assert!(UserUpdate::default().is_empty());
    }

    #[test]
    fn test_identity_from_me_payload() {
        let me: SessionIdentity = serde_json::from_str(
            r#"{"id": 4, "username": "lan", "email": "lan@x.vn", "role": "manager",
                "permissions": ["bill:view"], "is_active": true}"#,
        )
        .unwrap();
        assert!(me.has_permission(BILL_VIEW));
        assert!(!me.has_permission(BILL_CREATE));
        assert_eq!(me.roles(), vec![Role::Manager]);
        assert!(me.require(BILL_CREATE).is_err());
    }
}
