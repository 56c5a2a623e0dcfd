//! Dashboard routes and the guard in front of them
//!
//! Public paths are always served. Anything under `/dashboard` needs a signed
//! in session, and most pages also need a permission.

use serde::Serialize;

use crate::permission::{
    BILL_VIEW, USER_READ, VIEW_DOI_UNG_PAGE, VIEW_MOMO_HOADON_PAGE, VIEW_SYSTEM_SETTINGS,
};
use crate::user::SessionIdentity;

pub const LOGIN_PATH: &str = "/login";

const PUBLIC_PREFIXES: &[&str] = &["/login", "/about", "/contact", "/register"];

/// What a route asks of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Requirement {
    Public,
    SignedIn,
    Permission(&'static str),
    AnyOf(&'static [&'static str]),
    AllOf(&'static [&'static str]),
}

impl Requirement {
    fn satisfied_by(&self, identity: &SessionIdentity) -> bool {
        match self {
            Requirement::Public | Requirement::SignedIn => true,
            Requirement::Permission(p) => identity.has_permission(p),
            Requirement::AnyOf(ps) => identity.has_any(ps),
            Requirement::AllOf(ps) => identity.has_all(ps),
        }
    }
}

/// A dashboard page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: &'static str,
    pub label: &'static str,
    pub requirement: Requirement,
}

/// Sidebar pages, in display order
pub const ROUTES: &[Route] = &[
    Route {
        path: "/dashboard/hoa-don",
        label: "Hóa Đơn Đáo - Rút",
        requirement: Requirement::Permission(BILL_VIEW),
    },
    Route {
        path: "/dashboard/momo-hoadon",
        label: "Hóa Đơn MoMo",
        requirement: Requirement::Permission(VIEW_MOMO_HOADON_PAGE),
    },
    Route {
        path: "/dashboard/doi-ung",
        label: "Hóa Đơn Đối Ứng",
        requirement: Requirement::Permission(VIEW_DOI_UNG_PAGE),
    },
    Route {
        path: "/dashboard/reports",
        label: "Báo cáo",
        requirement: Requirement::SignedIn,
    },
    Route {
        path: "/dashboard/users",
        label: "Người dùng",
        requirement: Requirement::Permission(USER_READ),
    },
    Route {
        path: "/dashboard/settings",
        label: "Settings",
        requirement: Requirement::Permission(VIEW_SYSTEM_SETTINGS),
    },
];

/// Outcome of guarding a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Access {
    Granted,
    /// No session; go to the login page
    RedirectToLogin,
    /// Signed in without the needed permission
    Denied { requirement: Requirement },
}

/// The requirement for a path: the longest matching route prefix, otherwise
/// signed-in for anything under `/dashboard` and public for the rest.
pub fn requirement_for(path: &str) -> Requirement {
    if PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return Requirement::Public;
    }
    ROUTES
        .iter()
        .filter(|r| path == r.path || path.starts_with(&format!("{}/", r.path)))
        .max_by_key(|r| r.path.len())
        .map(|r| r.requirement)
        .unwrap_or_else(|| {
            if path.starts_with("/dashboard") {
                Requirement::SignedIn
            } else {
                Requirement::Public
            }
        })
}

/// Decides whether a session may open a path
pub fn check_access(path: &str, identity: Option<&SessionIdentity>) -> Access {
    let requirement = requirement_for(path);
    if requirement == Requirement::Public {
        return Access::Granted;
    }
    match identity {
        None => Access::RedirectToLogin,
        Some(id) if requirement.satisfied_by(id) => Access::Granted,
        Some(_) => Access::Denied { requirement },
    }
}

/// Sidebar entries the session may see
pub fn visible_routes(identity: &SessionIdentity) -> Vec<&'static Route> {
    ROUTES
        .iter()
        .filter(|r| r.requirement.satisfied_by(identity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{PermissionSet, Role};
    use core_kernel::UserId;

    fn identity(role: Role) -> SessionIdentity {
        SessionIdentity {
            id: UserId::new(1),
            username: "lan".into(),
            email: String::new(),
            role: Some(role.as_str().into()),
            roles: vec![],
            permissions: PermissionSet::for_roles(&[role]),
            is_active: true,
        }
    }

    #[test]
    fn test_public_paths_need_nothing() {
        assert_eq!(check_access("/login", None), Access::Granted);
        assert_eq!(check_access("/about/team", None), Access::Granted);
    }

    #[test]
    fn test_dashboard_without_session_redirects() {
        assert_eq!(check_access("/dashboard/hoa-don", None), Access::RedirectToLogin);
        assert_eq!(check_access("/dashboard", None), Access::RedirectToLogin);
    }

    #[test]
    fn test_viewer_denied_momo_page() {
        let viewer = identity(Role::Viewer);
        assert_eq!(check_access("/dashboard/hoa-don", Some(&viewer)), Access::Granted);
        assert!(matches!(
            check_access("/dashboard/momo-hoadon", Some(&viewer)),
            Access::Denied { .. }
        ));
    }

    #[test]
    fn test_sidebar_filters_by_permission() {
        let labels: Vec<_> = visible_routes(&identity(Role::Manager)).iter().map(|r| r.path).collect();
        assert_eq!(labels, vec!["/dashboard/hoa-don", "/dashboard/reports", "/dashboard/users"]);
        assert_eq!(visible_routes(&identity(Role::Admin)).len(), ROUTES.len());
    }
}
