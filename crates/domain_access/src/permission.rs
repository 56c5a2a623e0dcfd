//! Permissions and roles
//!
//! Permissions are plain strings granted by the backend. Roles map to a fixed
//! permission list; the admin role holds every known permission.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::AccessError;

pub const VIEW_DASHBOARD: &str = "view_dashboard";
pub const BILL_VIEW: &str = "bill:view";
pub const BILL_CREATE: &str = "bill:create";
pub const BILL_UPDATE: &str = "bill:update";
pub const BILL_DELETE: &str = "bill:delete";
pub const BILL_EXPORT: &str = "bill:export";

pub const USER_CREATE: &str = "user:create";
pub const USER_READ: &str = "user:read";
pub const USER_UPDATE: &str = "user:update";
pub const USER_DELETE: &str = "user:delete";

pub const REPORT_SUMMARY: &str = "report:summary";
pub const REPORT_COMMISSION: &str = "report:commission";
pub const REPORT_CALENDAR: &str = "report:calendar";

pub const VIEW_SYSTEM_SETTINGS: &str = "view_system_settings";
pub const MANAGE_SYSTEM: &str = "manage_system";

pub const VIEW_ABOUT_PAGE: &str = "view_about_page";
pub const VIEW_DOI_UNG_PAGE: &str = "view_doi_ung_page";
pub const VIEW_MOMO_HOADON_PAGE: &str = "view_momo_hoadon_page";
pub const VIEW_USERS_PAGE: &str = "view_users_page";
pub const VIEW_REPORTS_PAGE: &str = "view_reports_page";

pub const MANAGE_USER_PERMISSIONS: &str = "manage_user_permissions";
pub const GRANT_USER_PERMISSIONS: &str = "grant_user_permissions";
pub const REVOKE_USER_PERMISSIONS: &str = "revoke_user_permissions";
pub const VIEW_USER_PERMISSIONS: &str = "view_user_permissions";
pub const ASSIGN_USER_ROLES: &str = "assign_user_roles";
pub const REMOVE_USER_ROLES: &str = "remove_user_roles";

pub const MANAGE_ROLES: &str = "manage_roles";
pub const CREATE_ROLES: &str = "create_roles";
pub const EDIT_ROLES: &str = "edit_roles";
pub const DELETE_ROLES: &str = "delete_roles";
pub const VIEW_ROLES: &str = "view_roles";
pub const ASSIGN_ROLE_PERMISSIONS: &str = "assign_role_permissions";
pub const REMOVE_ROLE_PERMISSIONS: &str = "remove_role_permissions";

/// Every permission the console knows about
pub const ALL: &[&str] = &[
    VIEW_DASHBOARD,
    BILL_VIEW,
    BILL_CREATE,
    BILL_UPDATE,
    BILL_DELETE,
    BILL_EXPORT,
    USER_CREATE,
    USER_READ,
    USER_UPDATE,
    USER_DELETE,
    REPORT_SUMMARY,
    REPORT_COMMISSION,
    REPORT_CALENDAR,
    VIEW_SYSTEM_SETTINGS,
    MANAGE_SYSTEM,
    VIEW_ABOUT_PAGE,
    VIEW_DOI_UNG_PAGE,
    VIEW_MOMO_HOADON_PAGE,
    VIEW_USERS_PAGE,
    VIEW_REPORTS_PAGE,
    MANAGE_USER_PERMISSIONS,
    GRANT_USER_PERMISSIONS,
    REVOKE_USER_PERMISSIONS,
    VIEW_USER_PERMISSIONS,
    ASSIGN_USER_ROLES,
    REMOVE_USER_ROLES,
    MANAGE_ROLES,
    CREATE_ROLES,
    EDIT_ROLES,
    DELETE_ROLES,
    VIEW_ROLES,
    ASSIGN_ROLE_PERMISSIONS,
    REMOVE_ROLE_PERMISSIONS,
];

const MANAGER: &[&str] = &[
    VIEW_DASHBOARD,
    BILL_VIEW,
    BILL_CREATE,
    BILL_UPDATE,
    BILL_EXPORT,
    REPORT_SUMMARY,
    REPORT_COMMISSION,
    REPORT_CALENDAR,
    USER_READ,
];

const USER: &[&str] = &[
    VIEW_DASHBOARD,
    BILL_VIEW,
    BILL_CREATE,
    BILL_EXPORT,
    REPORT_SUMMARY,
    REPORT_CALENDAR,
];

const VIEWER: &[&str] = &[VIEW_DASHBOARD, BILL_VIEW, REPORT_SUMMARY];

/// Account roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    User,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::User, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
            Role::Viewer => "viewer",
        }
    }

    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Admin => ALL,
            Role::Manager => MANAGER,
            Role::User => USER,
            Role::Viewer => VIEWER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            "viewer" => Ok(Role::Viewer),
            other => Err(AccessError::UnknownRole(other.to_string())),
        }
    }
}

/// A set of granted permission strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(permissions.into_iter().map(Into::into).collect())
    }

    /// Union of the permissions of the given roles
    pub fn for_roles(roles: &[Role]) -> Self {
        Self::new(roles.iter().flat_map(|r| r.permissions().iter().copied()))
    }

    pub fn has(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    /// True when at least one is granted; false for an empty list
    pub fn has_any(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has(p))
    }

    /// True when every one is granted; true for an empty list
    pub fn has_all(&self, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has(p))
    }

    pub fn grant(&mut self, permission: impl Into<String>) {
        self.0.insert(permission.into());
    }

    pub fn revoke(&mut self, permission: &str) -> bool {
        self.0.remove(permission)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }
}
