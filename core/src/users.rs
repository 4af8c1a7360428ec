//! Users resource.
//!
//! Identifier-taking operations check the id shape first and return
//! `ApiError::InvalidId` without touching the transport.

use crate::client::Client;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::query::QueryOptions;
use crate::transport::Transport;
use crate::types::User;
use crate::validate::check_uuid_format;

/// Path sentinel the server resolves to the authenticated user.
pub const ME: &str = "me";

/// Server-side filters and includes for listing users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetUsersOptions {
    pub filter_search: Option<String>,
    pub filter_has_group: Vec<String>,
    pub filter_has_access: Vec<String>,
    pub filter_is_admin: bool,
    pub contain_last_logged_in: bool,
}

impl GetUsersOptions {
    pub fn search(mut self, needle: &str) -> Self {
        self.filter_search = Some(needle.to_string());
        self
    }

    /// Only users belonging to `group_id`. Repeatable.
    pub fn has_group(mut self, group_id: &str) -> Self {
        self.filter_has_group.push(group_id.to_string());
        self
    }

    /// Only users with access to `resource_id`. Repeatable.
    pub fn has_access(mut self, resource_id: &str) -> Self {
        self.filter_has_access.push(resource_id.to_string());
        self
    }

    pub fn admins_only(mut self) -> Self {
        self.filter_is_admin = true;
        self
    }

    pub fn with_last_logged_in(mut self) -> Self {
        self.contain_last_logged_in = true;
        self
    }
}

impl QueryOptions for GetUsersOptions {
    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.filter_search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("filter[search]".to_string(), search.to_string()));
        }
        for group in &self.filter_has_group {
            pairs.push(("filter[has-group][]".to_string(), group.clone()));
        }
        for resource in &self.filter_has_access {
            pairs.push(("filter[has-access][]".to_string(), resource.clone()));
        }
        if self.filter_is_admin {
            pairs.push(("filter[is-admin]".to_string(), "true".to_string()));
        }
        if self.contain_last_logged_in {
            pairs.push(("contain[LastLoggedIn]".to_string(), "true".to_string()));
        }
        pairs
    }
}

fn user_path(user_id: &str) -> String {
    format!("/users/{user_id}.json")
}

impl<T: Transport> Client<T> {
    /// List users, optionally filtered.
    pub async fn get_users(
        &self,
        ctx: &RequestContext,
        opts: Option<&GetUsersOptions>,
    ) -> Result<Vec<User>, ApiError> {
        let query = opts.map(|o| o.query_pairs()).unwrap_or_default();
        self.request_json::<(), _>(ctx, HttpMethod::Get, "/users.json", None, &query)
            .await
    }

    /// Create a user; the returned value has the server-assigned fields set.
    pub async fn create_user(&self, ctx: &RequestContext, user: &User) -> Result<User, ApiError> {
        self.request_json(ctx, HttpMethod::Post, "/users.json", Some(user), &[])
            .await
    }

    /// The currently authenticated user.
    pub async fn get_me(&self, ctx: &RequestContext) -> Result<User, ApiError> {
        self.get_user(ctx, ME).await
    }

    /// Fetch one user by id. Also accepts the `me` sentinel.
    pub async fn get_user(&self, ctx: &RequestContext, user_id: &str) -> Result<User, ApiError> {
        if user_id != ME {
            check_uuid_format(user_id)?;
        }
        self.request_json::<(), _>(ctx, HttpMethod::Get, &user_path(user_id), None, &[])
            .await
    }

    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        user: &User,
    ) -> Result<User, ApiError> {
        check_uuid_format(user_id)?;
        self.request_json(ctx, HttpMethod::Put, &user_path(user_id), Some(user), &[])
            .await
    }

    pub async fn delete_user(&self, ctx: &RequestContext, user_id: &str) -> Result<(), ApiError> {
        check_uuid_format(user_id)?;
        self.request_empty(ctx, HttpMethod::Delete, &user_path(user_id))
            .await
    }

    /// Ask the server whether `user_id` can be deleted, without deleting it.
    pub async fn delete_user_dry_run(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<(), ApiError> {
        check_uuid_format(user_id)?;
        let path = format!("/users/{user_id}/dry-run.json");
        self.request_empty(ctx, HttpMethod::Delete, &path).await
    }
}
