//! HTTP Access Adapter
//!
//! Implements [`AccessPort`] against the `/user` endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use core_kernel::{DomainPort, PortError, UserId};
use domain_access::{AccessPort, NewUser, PermissionInfo, SessionIdentity, User, UserUpdate};

use crate::client::{ApiClient, NO_QUERY};

const USERS: &str = "/user/";
const ME: &str = "/user/me";
const CREATE_USER: &str = "/user/create_user";
const PERMISSIONS: &str = "/user/permissions";

#[derive(Debug, Serialize)]
struct PermissionChange<'a> {
    permission_name: &'a str,
}

fn user_path(id: UserId) -> String {
    format!("/user/{}", id.value())
}

#[derive(Debug, Clone)]
pub struct HttpAccessAdapter {
    client: ApiClient,
}

impl HttpAccessAdapter {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl DomainPort for HttpAccessAdapter {}

#[async_trait]
impl AccessPort for HttpAccessAdapter {
    #[instrument(skip(self))]
    async fn me(&self) -> Result<SessionIdentity, PortError> {
        self.client.get_json("me", ME, &NO_QUERY).await
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, PortError> {
        self.client.get_json("list_users", USERS, &NO_QUERY).await
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: UserId) -> Result<User, PortError> {
        self.client.get_json("get_user", &user_path(id), &NO_QUERY).await
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    async fn create_user(&self, request: NewUser) -> Result<User, PortError> {
        let user: User = self
            .client
            .send_json("create_user", Method::POST, CREATE_USER, &request)
            .await?;
        info!(id = %user.id, "Created user");
        Ok(user)
    }

    #[instrument(skip(self, request))]
    async fn update_user(&self, id: UserId, request: UserUpdate) -> Result<User, PortError> {
        self.client
            .send_json("update_user", Method::PATCH, &user_path(id), &request)
            .await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: UserId) -> Result<(), PortError> {
        self.client
            .send_empty("delete_user", Method::DELETE, &user_path(id))
            .await?;
        info!("Deleted user");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn user_permissions(&self, id: UserId) -> Result<Vec<String>, PortError> {
        let path = format!("{}/permissions", user_path(id));
        self.client.get_json("user_permissions", &path, &NO_QUERY).await
    }

    #[instrument(skip(self))]
    async fn add_permission(&self, id: UserId, permission: &str) -> Result<(), PortError> {
        let path = format!("{}/add_permission", user_path(id));
        let _: Value = self
            .client
            .send_json("add_permission", Method::POST, &path, &PermissionChange { permission_name: permission })
            .await?;
        info!(permission, "Granted permission");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_permission(&self, id: UserId, permission: &str) -> Result<(), PortError> {
        let path = format!("{}/remove_permission", user_path(id));
        let _: Value = self
            .client
            .send_json("remove_permission", Method::POST, &path, &PermissionChange { permission_name: permission })
            .await?;
        info!(permission, "Revoked permission");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_permissions(&self) -> Result<Vec<PermissionInfo>, PortError> {
        self.client.get_json("list_permissions", PERMISSIONS, &NO_QUERY).await
    }
}
