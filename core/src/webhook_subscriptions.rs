//! Webhook subscriptions: where invitee events get delivered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{parse_collection, parse_empty, parse_resource, Query, ResourceClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::oauth::Token;
use crate::types::{CreatedAtSort, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookSubscriptionEvent {
    #[serde(rename = "invitee.created")]
    InviteeCreated,
    #[serde(rename = "invitee.canceled")]
    InviteeCanceled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookSubscriptionScope {
    Organization,
    User,
}

impl WebhookSubscriptionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookSubscriptionScope::Organization => "organization",
            WebhookSubscriptionScope::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookSubscriptionState {
    Active,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSubscription {
    pub uri: String,
    pub callback_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set while deliveries to the callback are failing and being retried.
    pub retry_started_at: Option<DateTime<Utc>>,
    pub state: WebhookSubscriptionState,
    pub events: Vec<WebhookSubscriptionEvent>,
    pub scope: WebhookSubscriptionScope,
    pub organization: String,
    pub user: Option<String>,
    pub creator: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookSubscriptionEntity {
    uri: String,
    callback_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    retry_started_at: Option<DateTime<Utc>>,
    state: WebhookSubscriptionState,
    events: Vec<WebhookSubscriptionEvent>,
    scope: WebhookSubscriptionScope,
    organization: String,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    creator: Option<String>,
}

impl From<WebhookSubscriptionEntity> for WebhookSubscription {
    fn from(entity: WebhookSubscriptionEntity) -> Self {
        WebhookSubscription {
            uri: entity.uri,
            callback_url: entity.callback_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            retry_started_at: entity.retry_started_at,
            state: entity.state,
            events: entity.events,
            scope: entity.scope,
            organization: entity.organization,
            user: entity.user,
            creator: entity.creator,
        }
    }
}

/// Body of `WebhookSubscriptionsClient::build_create`. `user` is required
/// when `scope` is `User`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookSubscriptionCreateOptions {
    pub url: String,
    pub events: Vec<WebhookSubscriptionEvent>,
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub scope: WebhookSubscriptionScope,
}

#[derive(Debug, Clone)]
pub struct WebhookSubscriptionOptions {
    pub organization: String,
    pub scope: WebhookSubscriptionScope,
    pub count: Option<u32>,
    pub page_token: Option<String>,
    pub sort: Option<CreatedAtSort>,
    pub user: Option<String>,
}

impl WebhookSubscriptionOptions {
    pub fn new(organization: &str, scope: WebhookSubscriptionScope) -> Self {
        Self {
            organization: organization.to_string(),
            scope,
            count: None,
            page_token: None,
            sort: None,
            user: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookSubscriptionsClient {
    inner: ResourceClient,
}

impl WebhookSubscriptionsClient {
    pub fn new(config: &ClientConfig, token: &Token) -> Self {
        Self {
            inner: ResourceClient::new(&config.api_base_url, token),
        }
    }

    pub fn build_create(
        &self,
        options: &WebhookSubscriptionCreateOptions,
    ) -> Result<HttpRequest, ApiError> {
        self.inner.post("/webhook_subscriptions", options)
    }

    pub fn build_get(&self, uuid: &str) -> HttpRequest {
        self.inner.get(&format!("/webhook_subscriptions/{uuid}"), Query::new())
    }

    pub fn build_list(&self, options: &WebhookSubscriptionOptions) -> HttpRequest {
        let query = Query::new()
            .opt("organization", Some(options.organization.as_str()))
            .opt("user", options.user.as_deref())
            .opt("scope", Some(options.scope.as_str()))
            .opt("count", options.count)
            .opt("page_token", options.page_token.as_deref())
            .opt("sort", options.sort.map(|s| s.as_str()));
        self.inner.get("/webhook_subscriptions", query)
    }

    pub fn build_delete(&self, uuid: &str) -> HttpRequest {
        self.inner.delete(&format!("/webhook_subscriptions/{uuid}"))
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<WebhookSubscription, ApiError> {
        parse_resource(response, |e: WebhookSubscriptionEntity| Ok(e.into()))
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<WebhookSubscription, ApiError> {
        parse_resource(response, |e: WebhookSubscriptionEntity| Ok(e.into()))
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Page<WebhookSubscription>, ApiError> {
        parse_collection(response, |e: WebhookSubscriptionEntity| Ok(e.into()))
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{response, token};

    fn client() -> WebhookSubscriptionsClient {
        WebhookSubscriptionsClient::new(&ClientConfig::with_base_url("http://localhost:3000"), &token())
    }

    #[test]
    fn build_create_serializes_event_literals() {
        let options = WebhookSubscriptionCreateOptions {
            url: "https://hooks.example/calendly".to_string(),
            events: vec![
                WebhookSubscriptionEvent::InviteeCreated,
                WebhookSubscriptionEvent::InviteeCanceled,
            ],
            organization: "https://api.calendly.com/organizations/ORG".to_string(),
            user: None,
            scope: WebhookSubscriptionScope::Organization,
        };
        let req = client().build_create(&options).unwrap();
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["events"], serde_json::json!(["invitee.created", "invitee.canceled"]));
        assert_eq!(body["scope"], "organization");
        assert!(body.get("user").is_none());
    }

    #[test]
    fn build_list_always_sends_organization_and_scope() {
        let mut options = WebhookSubscriptionOptions::new("ORG", WebhookSubscriptionScope::User);
        options.user = Some("U".to_string());
        assert_eq!(
            client().build_list(&options).path,
            "http://localhost:3000/webhook_subscriptions?organization=ORG&user=U&scope=user"
        );
    }

    #[test]
    fn parse_get_maps_state_and_events() {
        let body = r#"{"resource":{
            "uri": "https://api.calendly.com/webhook_subscriptions/WH1",
            "callback_url": "https://hooks.example/calendly",
            "created_at": "2024-01-02T03:04:05.000000Z",
            "updated_at": "2024-01-02T03:04:05.000000Z",
            "retry_started_at": null,
            "state": "disabled",
            "events": ["invitee.canceled"],
            "scope": "user",
            "organization": "https://api.calendly.com/organizations/ORG",
            "user": "https://api.calendly.com/users/U",
            "creator": "https://api.calendly.com/users/U"
        }}"#;
        let subscription = client().parse_get(response(200, body)).unwrap();
        assert_eq!(subscription.state, WebhookSubscriptionState::Disabled);
        assert_eq!(subscription.events, vec![WebhookSubscriptionEvent::InviteeCanceled]);
        let value = serde_json::to_value(&subscription).unwrap();
        assert_eq!(value["callbackUrl"], "https://hooks.example/calendly");
        assert!(value["retryStartedAt"].is_null());
    }
}
