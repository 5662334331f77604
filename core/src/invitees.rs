//! Invitees of a single scheduled event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{parse_collection, parse_resource, Query, ResourceClient};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::oauth::Token;
use crate::types::{CreatedAtSort, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteeStatus {
    Active,
    Canceled,
}

impl InviteeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteeStatus::Active => "active",
            InviteeStatus::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAndAnswer {
    pub question: String,
    pub answer: String,
    pub position: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    pub utm_campaign: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub salesforce_uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitee {
    pub uri: String,
    pub email: String,
    pub name: String,
    pub status: InviteeStatus,
    pub questions_and_answers: Vec<QuestionAndAnswer>,
    pub timezone: Option<String>,
    pub event: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tracking: Tracking,
    pub text_reminder_number: Option<String>,
    pub rescheduled: bool,
    pub old_invitee: Option<String>,
    pub new_invitee: Option<String>,
    pub cancel_url: String,
    pub reschedule_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct TrackingEntity {
    #[serde(default)]
    utm_campaign: Option<String>,
    #[serde(default)]
    utm_source: Option<String>,
    #[serde(default)]
    utm_medium: Option<String>,
    #[serde(default)]
    utm_content: Option<String>,
    #[serde(default)]
    utm_term: Option<String>,
    #[serde(default)]
    salesforce_uuid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InviteeEntity {
    uri: String,
    email: String,
    name: String,
    status: InviteeStatus,
    #[serde(default)]
    questions_and_answers: Vec<QuestionAndAnswer>,
    #[serde(default)]
    timezone: Option<String>,
    event: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    tracking: TrackingEntity,
    #[serde(default)]
    text_reminder_number: Option<String>,
    #[serde(default)]
    rescheduled: bool,
    #[serde(default)]
    old_invitee: Option<String>,
    #[serde(default)]
    new_invitee: Option<String>,
    cancel_url: String,
    reschedule_url: String,
}

impl From<InviteeEntity> for Invitee {
    fn from(entity: InviteeEntity) -> Self {
        let tracking = entity.tracking;
        Invitee {
            uri: entity.uri,
            email: entity.email,
            name: entity.name,
            status: entity.status,
            questions_and_answers: entity.questions_and_answers,
            timezone: entity.timezone,
            event: entity.event,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            tracking: Tracking {
                utm_campaign: tracking.utm_campaign,
                utm_source: tracking.utm_source,
                utm_medium: tracking.utm_medium,
                utm_content: tracking.utm_content,
                utm_term: tracking.utm_term,
                salesforce_uuid: tracking.salesforce_uuid,
            },
            text_reminder_number: entity.text_reminder_number,
            rescheduled: entity.rescheduled,
            old_invitee: entity.old_invitee,
            new_invitee: entity.new_invitee,
            cancel_url: entity.cancel_url,
            reschedule_url: entity.reschedule_url,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InviteeOptions {
    pub count: Option<u32>,
    pub email: Option<String>,
    pub page_token: Option<String>,
    pub sort: Option<CreatedAtSort>,
    pub status: Option<InviteeStatus>,
}

/// Client scoped to the invitees of one scheduled event.
#[derive(Debug, Clone)]
pub struct ScheduledEventInviteesClient {
    inner: ResourceClient,
}

impl ScheduledEventInviteesClient {
    pub fn new(config: &ClientConfig, token: &Token, scheduled_event_uuid: &str) -> Self {
        let base_url = format!(
            "{}/scheduled_events/{scheduled_event_uuid}",
            config.api_base_url.trim_end_matches('/')
        );
        Self {
            inner: ResourceClient::new(&base_url, token),
        }
    }

    pub fn build_get(&self, uuid: &str) -> HttpRequest {
        self.inner.get(&format!("/invitees/{uuid}"), Query::new())
    }

    pub fn build_list(&self, options: &InviteeOptions) -> HttpRequest {
        let query = Query::new()
            .opt("count", options.count)
            .opt("email", options.email.as_deref())
            .opt("page_token", options.page_token.as_deref())
            .opt("sort", options.sort.map(|s| s.as_str()))
            .opt("status", options.status.map(|s| s.as_str()));
        self.inner.get("/invitees", query)
    }

    pub fn parse_get(&self, response: HttpResponse) -> Result<Invitee, ApiError> {
        parse_resource(response, |e: InviteeEntity| Ok(e.into()))
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Page<Invitee>, ApiError> {
        parse_collection(response, |e: InviteeEntity| Ok(e.into()))
    }
}
