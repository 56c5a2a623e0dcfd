//! Access Domain
//!
//! Console accounts, roles and permission strings, the signed-in identity and
//! the guard that decides which dashboard pages a session may open.

pub mod permission;
pub mod user;
pub mod routes;
pub mod ports;
pub mod error;

pub use permission::{PermissionSet, Role};
pub use user::{NewUser, PermissionInfo, SessionIdentity, User, UserUpdate};
pub use routes::{check_access, requirement_for, visible_routes, Access, Requirement, Route, LOGIN_PATH, ROUTES};
pub use ports::AccessPort;
pub use error::AccessError;
