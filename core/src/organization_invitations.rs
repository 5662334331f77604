//! Invitations for users to join an organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{parse_collection, parse_empty, parse_resource, Query, ResourceClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::oauth::Token;
use crate::types::{CreatedAtSort, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationInvitationStatus {
    Accepted,
    Declined,
    Pending,
}

impl OrganizationInvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationInvitationStatus::Accepted => "accepted",
            OrganizationInvitationStatus::Declined => "declined",
            OrganizationInvitationStatus::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInvitation {
    pub uri: String,
    pub organization: String,
    pub email: String,
    pub status: OrganizationInvitationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Absent until the invitation email has gone out.
    pub last_sent_at: Option<DateTime<Utc>>,
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganizationInvitationEntity {
    uri: String,
    organization: String,
    email: String,
    status: OrganizationInvitationStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    last_sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    user: Option<String>,
}

impl From<OrganizationInvitationEntity> for OrganizationInvitation {
    fn from(entity: OrganizationInvitationEntity) -> Self {
        OrganizationInvitation {
            uri: entity.uri,
            organization: entity.organization,
            email: entity.email,
            status: entity.status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            last_sent_at: entity.last_sent_at,
            user: entity.user,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationInvitationCreateOptions {
    pub email: String,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationInvitationOptions {
    pub count: Option<u32>,
    pub email: Option<String>,
    pub page_token: Option<String>,
    pub sort: Option<CreatedAtSort>,
    pub status: Option<OrganizationInvitationStatus>,
}

/// Client scoped to the invitations of one organization.
#[derive(Debug, Clone)]
pub struct OrganizationInvitationsClient {
    inner: ResourceClient,
}

impl OrganizationInvitationsClient {
    pub fn new(config: &ClientConfig, token: &Token, organization_uuid: &str) -> Self {
        let base_url = format!(
            "{}/organizations/{organization_uuid}",
            config.api_base_url.trim_end_matches('/')
        );
        Self {
            inner: ResourceClient::new(&base_url, token),
        }
    }

    /// Sends the invitee an email asking them to join the organization.
    pub fn build_create(
        &self,
        options: &OrganizationInvitationCreateOptions,
    ) -> Result<HttpRequest, ApiError> {
        self.inner.post("/invitations", options)
    }

    pub fn build_get(&self, uuid: &str) -> HttpRequest {
        self.inner.get(&format!("/invitations/{uuid}"), Query::new())
    }

    pub fn build_list(&self, options: &OrganizationInvitationOptions) -> HttpRequest {
        let query = Query::new()
            .opt("count", options.count)
            .opt("email", options.email.as_deref())
            .opt("page_token", options.page_token.as_deref())
            .opt("sort", options.sort.map(|s| s.as_str()))
            .opt("status", options.status.map(|s| s.as_str()));
        self.inner.get("/invitations", query)
    }

    /// Revokes the invitation; its link stops working.
    pub fn build_delete(&self, uuid: &str) -> HttpRequest {
        self.inner.delete(&format!("/invitations/{uuid}"))
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<OrganizationInvitation, ApiError> {
        parse_resource(response, |e: OrganizationInvitationEntity| Ok(e.into()))
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<OrganizationInvitation, ApiError> {
        parse_resource(response, |e: OrganizationInvitationEntity| Ok(e.into()))
    }

    pub fn parse_list(
        &self,
        response: HttpResponse,
    ) -> Result<Page<OrganizationInvitation>, ApiError> {
        parse_collection(response, |e: OrganizationInvitationEntity| Ok(e.into()))
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }
}
