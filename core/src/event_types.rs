//! Event types: the bookable meeting templates a user or team publishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{parse_collection, parse_resource, Query, ResourceClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::oauth::Token;
use crate::types::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Solo,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolingType {
    #[serde(rename = "round robin", alias = "round_robin")]
    RoundRobin,
    #[serde(rename = "collective")]
    Collective,
}

/// The `type` field of an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTypeKind {
    AdhocEventType,
    StandardEventType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileType {
    #[serde(rename = "user", alias = "User")]
    User,
    #[serde(rename = "team", alias = "Team")]
    Team,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTypeSort {
    NameAscending,
    NameDescending,
}

impl EventTypeSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventTypeSort::NameAscending => "name:asc",
            EventTypeSort::NameDescending => "name:desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "type")]
    pub profile_type: ProfileType,
    pub name: String,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    pub uri: String,
    pub name: String,
    pub active: bool,
    pub slug: Option<String>,
    pub scheduling_url: String,
    pub duration: u32,
    pub kind: Kind,
    pub pooling_type: Option<PoolingType>,
    #[serde(rename = "type")]
    pub event_type_kind: EventTypeKind,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub internal_note: Option<String>,
    pub description_plain: Option<String>,
    pub description_html: Option<String>,
    pub profile: Option<Profile>,
    pub secret: bool,
}

#[derive(Debug, Deserialize)]
struct EventTypeEntity {
    uri: String,
    name: String,
    active: bool,
    #[serde(default)]
    slug: Option<String>,
    scheduling_url: String,
    duration: u32,
    kind: Kind,
    #[serde(default)]
    pooling_type: Option<PoolingType>,
    #[serde(rename = "type")]
    event_type_kind: EventTypeKind,
    color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    internal_note: Option<String>,
    #[serde(default)]
    description_plain: Option<String>,
    #[serde(default)]
    description_html: Option<String>,
    #[serde(default)]
    profile: Option<Profile>,
    secret: bool,
}

impl From<EventTypeEntity> for EventType {
    fn from(entity: EventTypeEntity) -> Self {
        EventType {
            uri: entity.uri,
            name: entity.name,
            active: entity.active,
            slug: entity.slug,
            scheduling_url: entity.scheduling_url,
            duration: entity.duration,
            kind: entity.kind,
            pooling_type: entity.pooling_type,
            event_type_kind: entity.event_type_kind,
            color: entity.color,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            internal_note: entity.internal_note,
            description_plain: entity.description_plain,
            description_html: entity.description_html,
            profile: entity.profile,
            secret: entity.secret,
        }
    }
}

/// Filters for `EventTypesClient::build_list`.
#[derive(Debug, Clone, Default)]
pub struct EventTypeOptions {
    /// URI of the user whose event types to list.
    pub user: Option<String>,
    pub organization: Option<String>,
    pub count: Option<u32>,
    pub page_token: Option<String>,
    pub sort: Option<EventTypeSort>,
}

#[derive(Debug, Clone)]
pub struct EventTypesClient {
    inner: ResourceClient,
}

impl EventTypesClient {
    pub fn new(config: &ClientConfig, token: &Token) -> Self {
        Self {
            inner: ResourceClient::new(&config.api_base_url, token),
        }
    }

    pub fn build_get(&self, uuid: &str) -> HttpRequest {
        self.inner.get(&format!("/event_types/{uuid}"), Query::new())
    }

    pub fn build_list(&self, options: &EventTypeOptions) -> HttpRequest {
        let query = Query::new()
            .opt("user", options.user.as_deref())
            .opt("organization", options.organization.as_deref())
            .opt("count", options.count)
            .opt("page_token", options.page_token.as_deref())
            .opt("sort", options.sort.map(|s| s.as_str()));
        self.inner.get("/event_types", query)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<EventType, ApiError> {
        parse_resource(response, |e: EventTypeEntity| Ok(e.into()))
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Page<EventType>, ApiError> {
        parse_collection(response, |e: EventTypeEntity| Ok(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{response, token};
    use crate::http::HttpMethod;

    const EVENT_TYPE_JSON: &str = r##"{
        "uri": "https://api.calendly.com/event_types/ET1",
        "name": "30 Minute Meeting",
        "active": true,
        "slug": "30min",
        "scheduling_url": "https://calendly.com/ada/30min",
        "duration": 30,
        "kind": "solo",
        "pooling_type": null,
        "type": "StandardEventType",
        "color": "#fff200",
        "created_at": "2024-01-02T03:04:05.000000Z",
        "updated_at": "2024-01-02T03:04:05.000000Z",
        "internal_note": null,
        "description_plain": "Quick chat",
        "description_html": "<p>Quick chat</p>",
        "profile": {"type": "User", "name": "Ada", "owner": "https://api.calendly.com/users/AAAA"},
        "secret": false
    }"##;

    fn client() -> EventTypesClient {
        EventTypesClient::new(&ClientConfig::with_base_url("http://localhost:3000"), &token())
    }

    #[test]
    fn build_get_produces_correct_request() {
        let req = client().build_get("ET1");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/event_types/ET1");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_list_encodes_options() {
        let options = EventTypeOptions {
            user: Some("https://api.calendly.com/users/AAAA".to_string()),
            count: Some(10),
            sort: Some(EventTypeSort::NameDescending),
            ..Default::default()
        };
        let req = client().build_list(&options);
        assert_eq!(
            req.path,
            "http://localhost:3000/event_types?user=https%3A%2F%2Fapi.calendly.com%2Fusers%2FAAAA&count=10&sort=name%3Adesc"
        );
    }

    #[test]
    fn parse_list_maps_every_entity() {
        let body = format!(
            r#"{{"collection":[{EVENT_TYPE_JSON}],"pagination":{{"count":1,"next_page":null}}}}"#
        );
        let page = client().parse_list(response(200, &body)).unwrap();
        assert_eq!(page.collection.len(), 1);
        let event_type = &page.collection[0];
        assert_eq!(event_type.kind, Kind::Solo);
        assert_eq!(event_type.event_type_kind, EventTypeKind::StandardEventType);
        assert_eq!(page.pagination.count, 1);

        let value = serde_json::to_value(event_type).unwrap();
        assert_eq!(value["schedulingUrl"], "https://calendly.com/ada/30min");
        assert_eq!(value["descriptionPlain"], "Quick chat");
        assert_eq!(value["type"], "StandardEventType");
    }

    #[test]
    fn pooling_type_uses_spaced_literal() {
        let pooling: PoolingType = serde_json::from_str(r#""round robin""#).unwrap();
        assert_eq!(pooling, PoolingType::RoundRobin);
        assert_eq!(serde_json::to_string(&pooling).unwrap(), r#""round robin""#);
    }
}
