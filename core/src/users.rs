//! Users: lookup by UUID and the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{parse_resource, Query, ResourceClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::oauth::Token;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uri: String,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub scheduling_url: String,
    pub timezone: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_organization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEntity {
    uri: String,
    name: String,
    slug: String,
    email: String,
    scheduling_url: String,
    timezone: String,
    #[serde(default)]
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    current_organization: Option<String>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        User {
            uri: entity.uri,
            name: entity.name,
            slug: entity.slug,
            email: entity.email,
            scheduling_url: entity.scheduling_url,
            timezone: entity.timezone,
            avatar_url: entity.avatar_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            current_organization: entity.current_organization,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UsersClient {
    inner: ResourceClient,
}

impl UsersClient {
    pub fn new(config: &ClientConfig, token: &Token) -> Self {
        Self {
            inner: ResourceClient::new(&config.api_base_url, token),
        }
    }

    pub fn build_get(&self, uuid: &str) -> HttpRequest {
        self.inner.get(&format!("/users/{uuid}"), Query::new())
    }

    /// The user the access token belongs to.
    pub fn build_me(&self) -> HttpRequest {
        self.inner.get("/users/me", Query::new())
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_resource(response, |e: UserEntity| Ok(e.into()))
    }

    pub fn parse_me(&self, response: HttpResponse) -> Result<User, ApiError> {
        self.parse_get(response)
    }
}
