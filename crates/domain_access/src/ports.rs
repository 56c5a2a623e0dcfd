//! Access Ports
//!
//! Account management and session lookup against the backend.

use async_trait::async_trait;
use core_kernel::{DomainPort, PortError, UserId};

use crate::user::{NewUser, PermissionInfo, SessionIdentity, User, UserUpdate};

#[async_trait]
pub trait AccessPort: DomainPort {
    /// The signed-in session; `PortError::Unauthorized` when there is none
    async fn me(&self) -> Result<SessionIdentity, PortError>;

    async fn list_users(&self) -> Result<Vec<User>, PortError>;

    async fn get_user(&self, id: UserId) -> Result<User, PortError>;

    async fn create_user(&self, request: NewUser) -> Result<User, PortError>;

    async fn update_user(&self, id: UserId, request: UserUpdate) -> Result<User, PortError>;

    async fn delete_user(&self, id: UserId) -> Result<(), PortError>;

    /// Permissions currently granted to one account
    async fn user_permissions(&self, id: UserId) -> Result<Vec<String>, PortError>;

    async fn add_permission(&self, id: UserId, permission: &str) -> Result<(), PortError>;

    async fn remove_permission(&self, id: UserId, permission: &str) -> Result<(), PortError>;

    /// Every permission the backend knows
    async fn list_permissions(&self) -> Result<Vec<PermissionInfo>, PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use crate::permission::{self, PermissionSet};
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of AccessPort
    #[derive(Debug, Default)]
    pub struct MockAccessPort {
        users: Arc<RwLock<HashMap<UserId, User>>>,
        grants: Arc<RwLock<HashMap<UserId, PermissionSet>>>,
        session: Arc<RwLock<Option<UserId>>>,
    }

    impl MockAccessPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates one account with its permissions and signs it in
        pub async fn signed_in_as(user: User, permissions: PermissionSet) -> Self {
            let port = Self::new();
            port.grants.write().await.insert(user.id, permissions);
            *port.session.write().await = Some(user.id);
            port.users.write().await.insert(user.id, user);
            port
        }

        pub async fn sign_out(&self) {
            *self.session.write().await = None;
        }

        async fn find(&self, id: UserId) -> Result<User, PortError> {
            self.users
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }
    }

    impl DomainPort for MockAccessPort {}

    #[async_trait]
    impl AccessPort for MockAccessPort {
        async fn me(&self) -> Result<SessionIdentity, PortError> {
            let id = self
                .session
                .read()
                .await
                .ok_or_else(|| PortError::unauthorized("no session"))?;
            let user = self.find(id).await?;
            let permissions = self.grants.read().await.get(&id).cloned().unwrap_or_default();
            Ok(SessionIdentity {
                id,
                username: user.username,
                email: user.email,
                role: user.role,
                roles: Vec::new(),
                permissions,
                is_active: user.is_active,
            })
        }

        async fn list_users(&self) -> Result<Vec<User>, PortError> {
            let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
            users.sort_by_key(|u| u.id);
            Ok(users)
        }

        async fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.find(id).await
        }

        async fn create_user(&self, request: NewUser) -> Result<User, PortError> {
            let mut users = self.users.write().await;
            if users.values().any(|u| u.username == request.username) {
                return Err(PortError::validation_field("Username already registered", "username"));
            }
            let next = users.keys().map(|id| id.value()).max().unwrap_or(0) + 1;
            let now = Utc::now();
            let user = User {
                id: UserId::new(next),
                username: request.username,
                email: request.email,
                role: Some(request.role.as_str().to_string()),
                is_active: true,
                created_at: Some(now),
                updated_at: Some(now),
            };
            users.insert(user.id, user.clone());
            self.grants
                .write()
                .await
                .insert(user.id, PermissionSet::for_roles(&[request.role]));
            Ok(user)
        }

        async fn update_user(&self, id: UserId, request: UserUpdate) -> Result<User, PortError> {
            let mut users = self.users.write().await;
            let user = users.get_mut(&id).ok_or_else(|| PortError::not_found("User", id))?;
            if let Some(username) = request.username {
                user.username = username;
            }
            if let Some(email) = request.email {
                user.email = email;
            }
            if let Some(role) = request.role {
                user.role = Some(role.as_str().to_string());
            }
            if let Some(active) = request.is_active {
                user.is_active = active;
            }
            user.updated_at = Some(Utc::now());
            Ok(user.clone())
        }

        async fn delete_user(&self, id: UserId) -> Result<(), PortError> {
            self.users
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("User", id))
        }

        async fn user_permissions(&self, id: UserId) -> Result<Vec<String>, PortError> {
            self.find(id).await?;
            let grants = self.grants.read().await;
            Ok(grants
                .get(&id)
                .map(|set| set.iter().map(str::to_string).collect())
                .unwrap_or_default())
        }

        async fn add_permission(&self, id: UserId, permission: &str) -> Result<(), PortError> {
            self.find(id).await?;
            self.grants.write().await.entry(id).or_default().grant(permission);
            Ok(())
        }

        async fn remove_permission(&self, id: UserId, permission: &str) -> Result<(), PortError> {
            self.find(id).await?;
            if let Some(set) = self.grants.write().await.get_mut(&id) {
                set.revoke(permission);
            }
            Ok(())
        }

        async fn list_permissions(&self) -> Result<Vec<PermissionInfo>, PortError> {
            Ok(permission::ALL
                .iter()
                .enumerate()
                .map(|(i, name)| PermissionInfo {
                    id: Some(i as i64 + 1),
                    name: name.to_string(),
                    description: None,
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockAccessPort;
    use super::*;
    use crate::permission::{PermissionSet, Role, BILL_DELETE};

    fn user(id: i64) -> User {
        User {
            id: UserId::new(id),
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            role: Some("viewer".into()),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let port = MockAccessPort::signed_in_as(user(1), PermissionSet::for_roles(&[Role::Viewer])).await;
        assert_eq!(port.me().await.unwrap().username, "user1");
        port.sign_out().await;
        assert!(port.me().await.unwrap_err().is_unauthorized());
    }

    #[tokio::test]
    async fn test_grant_and_revoke() {
        let port = MockAccessPort::signed_in_as(user(1), PermissionSet::default()).await;
        port.add_permission(UserId::new(1), BILL_DELETE).await.unwrap();
        assert!(port.me().await.unwrap().has_permission(BILL_DELETE));
        port.remove_permission(UserId::new(1), BILL_DELETE).await.unwrap();
        assert!(port.user_permissions(UserId::new(1)).await.unwrap().is_empty());
    }
}
