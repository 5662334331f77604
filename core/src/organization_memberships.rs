//! Organization memberships: which users belong to an organization, and in
//! what role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{parse_collection, parse_empty, parse_resource, Query, ResourceClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::oauth::Token;
use crate::types::Page;
use crate::users::{User, UserEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationRole {
    Admin,
    Owner,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMembership {
    pub uri: String,
    pub role: OrganizationRole,
    pub user: User,
    pub organization: String,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct OrganizationMembershipEntity {
    uri: String,
    role: OrganizationRole,
    user: UserEntity,
    organization: String,
    updated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<OrganizationMembershipEntity> for OrganizationMembership {
    fn from(entity: OrganizationMembershipEntity) -> Self {
        OrganizationMembership {
            uri: entity.uri,
            role: entity.role,
            user: entity.user.into(),
            organization: entity.organization,
            updated_at: entity.updated_at,
            created_at: entity.created_at,
        }
    }
}

/// Filters for `OrganizationMembershipsClient::build_list`. One of
/// `organization` or `user` is required by the remote API.
#[derive(Debug, Clone, Default)]
pub struct OrganizationMembershipOptions {
    pub organization: Option<String>,
    pub user: Option<String>,
    pub count: Option<u32>,
    pub email: Option<String>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrganizationMembershipsClient {
    inner: ResourceClient,
}

impl OrganizationMembershipsClient {
    pub fn new(config: &ClientConfig, token: &Token) -> Self {
        Self {
            inner: ResourceClient::new(&config.api_base_url, token),
        }
    }

    pub fn build_get(&self, uuid: &str) -> HttpRequest {
        self.inner
            .get(&format!("/organization_memberships/{uuid}"), Query::new())
    }

    pub fn build_list(&self, options: &OrganizationMembershipOptions) -> HttpRequest {
        let query = Query::new()
            .opt("organization", options.organization.as_deref())
            .opt("user", options.user.as_deref())
            .opt("count", options.count)
            .opt("email", options.email.as_deref())
            .opt("page_token", options.page_token.as_deref());
        self.inner.get("/organization_memberships", query)
    }

    /// Removes the user from the organization. Requires admin rights, and the
    /// owner's membership cannot be deleted.
    pub fn build_delete(&self, uuid: &str) -> HttpRequest {
        self.inner.delete(&format!("/organization_memberships/{uuid}"))
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<OrganizationMembership, ApiError> {
        parse_resource(response, |e: OrganizationMembershipEntity| Ok(e.into()))
    }

    pub fn parse_list(
        &self,
        response: HttpResponse,
    ) -> Result<Page<OrganizationMembership>, ApiError> {
        parse_collection(response, |e: OrganizationMembershipEntity| Ok(e.into()))
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{response, token};
    use crate::http::HttpMethod;
    use crate::users::tests::USER_JSON;

    fn client() -> OrganizationMembershipsClient {
        OrganizationMembershipsClient::new(&ClientConfig::with_base_url("http://localhost:3000"), &token())
    }

    #[test]
    fn build_delete_produces_correct_request() {
        let req = client().build_delete("OM1");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/organization_memberships/OM1");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_filters_by_email() {
        let options = OrganizationMembershipOptions {
            organization: Some("ORG".to_string()),
            email: Some("ada@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(
            client().build_list(&options).path,
            "http://localhost:3000/organization_memberships?organization=ORG&email=ada%40example.com"
        );
    }

    #[test]
    fn parse_list_maps_nested_user() {
        let body = format!(
            r#"{{"collection":[{{
                "uri": "https://api.calendly.com/organization_memberships/OM1",
                "role": "admin",
                "user": {USER_JSON},
                "organization": "https://api.calendly.com/organizations/ORG",
                "updated_at": "2024-01-02T03:04:05.000000Z",
                "created_at": "2024-01-02T03:04:05.000000Z"
            }}],"pagination":{{"count":1,"next_page":null}}}}"#
        );
        let page = client().parse_list(response(200, &body)).unwrap();
        let membership = &page.collection[0];
        assert_eq!(membership.role, OrganizationRole::Admin);
        assert_eq!(membership.user.name, "Ada Lovelace");
        let value = serde_json::to_value(membership).unwrap();
        assert_eq!(value["user"]["schedulingUrl"], "https://calendly.com/ada");
    }

    #[test]
    fn parse_delete_relays_forbidden() {
        let body = r#"{"title":"Permission Denied","message":"You do not have permission"}"#;
        let err = client().parse_delete(response(403, body)).unwrap_err();
        assert_eq!(err.status(), Some(403));
    }
}
