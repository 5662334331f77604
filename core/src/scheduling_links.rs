//! Single-use scheduling links.

use serde::{Deserialize, Serialize};

use crate::client::{parse_resource, ResourceClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::oauth::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingLinkOwnerType {
    EventType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingLink {
    pub booking_url: String,
    pub owner: String,
    pub owner_type: SchedulingLinkOwnerType,
}

#[derive(Debug, Deserialize)]
struct SchedulingLinkEntity {
    booking_url: String,
    owner: String,
    owner_type: SchedulingLinkOwnerType,
}

/// Options for `SchedulingLinksClient::build_create`. The remote API only
/// accepts `max_event_count = 1`, which is what `for_event_type` sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulingLinkCreateOptions {
    pub max_event_count: u32,
    pub owner: String,
    pub owner_type: SchedulingLinkOwnerType,
}

impl SchedulingLinkCreateOptions {
    pub fn for_event_type(event_type_uri: &str) -> Self {
        Self {
            max_event_count: 1,
            owner: event_type_uri.to_string(),
            owner_type: SchedulingLinkOwnerType::EventType,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulingLinksClient {
    inner: ResourceClient,
}

impl SchedulingLinksClient {
    pub fn new(config: &ClientConfig, token: &Token) -> Self {
        Self {
            inner: ResourceClient::new(&config.api_base_url, token),
        }
    }

    pub fn build_create(&self, options: &SchedulingLinkCreateOptions) -> Result<HttpRequest, ApiError> {
        self.inner.post("/scheduling_links", options)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<SchedulingLink, ApiError> {
        parse_resource(response, |e: SchedulingLinkEntity| {
            Ok(SchedulingLink {
                booking_url: e.booking_url,
                owner: e.owner,
                owner_type: e.owner_type,
            })
        })
    }
}
