//! Account management screen
//!
//! Payloads are checked locally first; a payload that fails the checks never
//! reaches the backend.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::UserId;
use domain_access::{permission, AccessError, AccessPort, NewUser, PermissionInfo, User, UserUpdate};

use crate::error::DashboardError;

pub struct UserScreen {
    port: Arc<dyn AccessPort>,
    users: Vec<User>,
}

impl UserScreen {
    pub fn new(port: Arc<dyn AccessPort>) -> Self {
        Self { port, users: Vec::new() }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&[User], DashboardError> {
        self.users = self.port.list_users().await?;
        Ok(&self.users)
    }

    pub async fn get(&self, id: UserId) -> Result<User, DashboardError> {
        Ok(self.port.get_user(id).await?)
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create(&mut self, request: NewUser) -> Result<User, DashboardError> {
        request.check()?;
        let user = self.port.create_user(request).await?;
        info!(id = user.id.value(), "Account created");
        self.load().await?;
        Ok(user)
    }

    /// Applies a partial update; an empty one is a no-op returning the current account
    #[instrument(skip(self, update), fields(id = id.value()))]
    pub async fn update(&mut self, id: UserId, update: UserUpdate) -> Result<User, DashboardError> {
        update.check()?;
        if update.is_empty() {
            return self.get(id).await;
        }
        let user = self.port.update_user(id, update).await?;
        self.load().await?;
        Ok(user)
    }

    #[instrument(skip(self), fields(id = id.value()))]
    pub async fn delete(&mut self, id: UserId) -> Result<(), DashboardError> {
        self.port.delete_user(id).await?;
        info!("Account deleted");
        self.load().await?;
        Ok(())
    }

    pub async fn permissions_of(&self, id: UserId) -> Result<Vec<String>, DashboardError> {
        Ok(self.port.user_permissions(id).await?)
    }

    #[instrument(skip(self), fields(id = id.value()))]
    pub async fn grant(&self, id: UserId, permission: &str) -> Result<(), DashboardError> {
        known(permission)?;
        self.port.add_permission(id, permission).await?;
        info!(permission, "Permission granted");
        Ok(())
    }

    #[instrument(skip(self), fields(id = id.value()))]
    pub async fn revoke(&self, id: UserId, permission: &str) -> Result<(), DashboardError> {
        known(permission)?;
        self.port.remove_permission(id, permission).await?;
        info!(permission, "Permission revoked");
        Ok(())
    }

    /// Every permission the backend offers
    pub async fn catalogue(&self) -> Result<Vec<PermissionInfo>, DashboardError> {
        Ok(self.port.list_permissions().await?)
    }
}

fn known(name: &str) -> Result<(), AccessError> {
    if permission::ALL.contains(&name) {
        Ok(())
    } else {
        warn!(permission = name, "Unknown permission");
        Err(AccessError::UnknownPermission(name.to_string()))
    }
}
