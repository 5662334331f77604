//! In-memory stand-in for the Calendly v2 API.
//!
//! Serves the same snake_case shapes as the real service: single objects in a
//! `{resource}` envelope, lists in `{collection, pagination}`, failures as
//! `{title, message, details}` (or `{error, error_description}` on the OAuth
//! endpoints). Page tokens are plain offsets.

mod seed;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const API_URI: &str = "https://api.calendly.com";
pub const CLIENT_ID: &str = "mock-client-id";
pub const SEED_ACCESS_TOKEN: &str = "mock-access-token";
pub const SEED_REFRESH_TOKEN: &str = "mock-refresh-token";
pub const OWNER_UUID: &str = "AAAAAAAAAAAAAAAA";
pub const MEMBER_UUID: &str = "CCCCCCCCCCCCCCCC";
pub const ORGANIZATION_UUID: &str = "BBBBBBBBBBBBBBBB";

const DEFAULT_PAGE_SIZE: usize = 20;
const WEBHOOK_EVENTS: [&str; 2] = ["invitee.created", "invitee.canceled"];

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub uri: String,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub scheduling_url: String,
    pub timezone: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub current_organization: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "type")]
    pub profile_type: String,
    pub name: String,
    pub owner: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventType {
    pub uri: String,
    pub name: String,
    pub active: bool,
    pub slug: Option<String>,
    pub scheduling_url: String,
    pub duration: u32,
    pub kind: String,
    pub pooling_type: Option<String>,
    #[serde(rename = "type")]
    pub event_type_kind: String,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
    pub internal_note: Option<String>,
    pub description_plain: Option<String>,
    pub description_html: Option<String>,
    pub profile: Option<Profile>,
    pub secret: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InviteesCounter {
    pub total: u32,
    pub active: u32,
    pub limit: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventMembership {
    pub user: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub uri: String,
    pub name: String,
    pub status: String,
    pub start_time: String,
    pub end_time: String,
    pub event_type: String,
    pub location: Value,
    pub invitees_counter: InviteesCounter,
    pub created_at: String,
    pub updated_at: String,
    pub event_memberships: Vec<EventMembership>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionAndAnswer {
    pub question: String,
    pub answer: String,
    pub position: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tracking {
    pub utm_campaign: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_content: Option<String>,
    pub utm_term: Option<String>,
    pub salesforce_uuid: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invitee {
    pub uri: String,
    pub email: String,
    pub name: String,
    pub status: String,
    pub questions_and_answers: Vec<QuestionAndAnswer>,
    pub timezone: Option<String>,
    pub event: String,
    pub created_at: String,
    pub updated_at: String,
    pub tracking: Tracking,
    pub text_reminder_number: Option<String>,
    pub rescheduled: bool,
    pub old_invitee: Option<String>,
    pub new_invitee: Option<String>,
    pub cancel_url: String,
    pub reschedule_url: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrganizationMembership {
    pub uri: String,
    pub role: String,
    pub user: User,
    pub organization: String,
    pub updated_at: String,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrganizationInvitation {
    pub uri: String,
    pub organization: String,
    pub email: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub last_sent_at: Option<String>,
    pub user: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchedulingLink {
    pub booking_url: String,
    pub owner: String,
    pub owner_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub uri: String,
    pub callback_url: String,
    pub created_at: String,
    pub updated_at: String,
    pub retry_started_at: Option<String>,
    pub state: String,
    pub events: Vec<String>,
    pub scope: String,
    pub organization: String,
    pub user: Option<String>,
    pub creator: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub created_at: i64,
    pub expires_in: u64,
    pub owner: String,
    pub organization: String,
}

#[derive(Clone, Debug)]
struct IssuedToken {
    refresh_token: String,
    created_at: i64,
    expires_in: u64,
}

pub struct Store {
    users: Vec<User>,
    event_types: Vec<EventType>,
    scheduled_events: Vec<ScheduledEvent>,
    invitees: Vec<Invitee>,
    memberships: Vec<OrganizationMembership>,
    invitations: Vec<OrganizationInvitation>,
    webhook_subscriptions: Vec<WebhookSubscription>,
    tokens: HashMap<String, IssuedToken>,
}

pub type Db = Arc<RwLock<Store>>;

// ---------------------------------------------------------------------------
// Envelopes and failures
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct Resource<T> {
    pub resource: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Collection<T> {
    pub collection: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Pagination {
    pub count: usize,
    pub next_page: Option<String>,
    pub next_page_token: Option<String>,
    pub previous_page: Option<String>,
    pub previous_page_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub parameter: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum FailureBody {
    Calendly {
        title: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        details: Vec<ErrorDetail>,
    },
    OAuth {
        error: &'static str,
        error_description: String,
    },
}

#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    body: FailureBody,
}

impl Failure {
    fn calendly(status: StatusCode, title: &'static str, message: &str) -> Self {
        Self {
            status,
            body: FailureBody::Calendly {
                title,
                message: message.to_string(),
                details: Vec::new(),
            },
        }
    }

    fn not_found() -> Self {
        Self::calendly(
            StatusCode::NOT_FOUND,
            "Resource Not Found",
            "The server could not find the requested resource.",
        )
    }

    fn unauthenticated() -> Self {
        Self::calendly(
            StatusCode::UNAUTHORIZED,
            "Unauthenticated",
            "The access token is invalid",
        )
    }

    fn permission_denied(message: &str) -> Self {
        Self::calendly(StatusCode::FORBIDDEN, "Permission Denied", message)
    }

    fn already_exists(message: &str) -> Self {
        Self::calendly(StatusCode::CONFLICT, "Already Exists", message)
    }

    fn invalid_argument(parameter: &str, message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: FailureBody::Calendly {
                title: "Invalid Argument",
                message: "The supplied parameters are invalid.".to_string(),
                details: vec![ErrorDetail {
                    parameter: Some(parameter.to_string()),
                    message: message.to_string(),
                }],
            },
        }
    }

    fn oauth(status: StatusCode, error: &'static str, description: &str) -> Self {
        Self {
            status,
            body: FailureBody::OAuth {
                error,
                error_description: description.to_string(),
            },
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        debug!(status = self.status.as_u16(), "mock_request_rejected");
        (self.status, Json(self.body)).into_response()
    }
}

type ApiResult<T> = Result<T, Failure>;

fn resource<T>(value: T) -> Json<Resource<T>> {
    Json(Resource { resource: value })
}

/// Slice `items` into one page. `page_token` is the offset of the first item.
fn paginate<T>(
    items: Vec<T>,
    count: Option<usize>,
    page_token: Option<&str>,
    path: &str,
) -> ApiResult<Json<Collection<T>>> {
    let count = count.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=100).contains(&count) {
        return Err(Failure::invalid_argument("count", "must be between 1 and 100"));
    }
    let offset = match page_token {
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| Failure::invalid_argument("page_token", "is invalid"))?,
        None => 0,
    };

    let total = items.len();
    let collection: Vec<T> = items.into_iter().skip(offset).take(count).collect();
    let end = offset.saturating_add(count);
    let next = (end < total).then(|| end.to_string());
    let previous = (offset > 0).then(|| offset.saturating_sub(count).to_string());
    let link = |token: &String| format!("{API_URI}{path}?count={count}&page_token={token}");

    Ok(Json(Collection {
        pagination: Pagination {
            count: collection.len(),
            next_page: next.as_ref().map(link),
            next_page_token: next,
            previous_page: previous.as_ref().map(link),
            previous_page_token: previous,
        },
        collection,
    }))
}

fn uuid_of(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

fn new_uuid() -> String {
    Uuid::new_v4().simple().to_string()[..16].to_uppercase()
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(parameter: &str, value: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| Failure::invalid_argument(parameter, "must be an ISO 8601 timestamp"))
}

fn require_user_or_organization(user: Option<&str>, organization: Option<&str>) -> ApiResult<()> {
    if user.is_none() && organization.is_none() {
        return Err(Failure::invalid_argument(
            "organization",
            "user or organization is required",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/{uuid}", get(get_user))
        .route("/event_types", get(list_event_types))
        .route("/event_types/{uuid}", get(get_event_type))
        .route("/scheduled_events", get(list_scheduled_events))
        .route("/scheduled_events/{uuid}", get(get_scheduled_event))
        .route("/scheduled_events/{uuid}/invitees", get(list_invitees))
        .route("/scheduled_events/{uuid}/invitees/{invitee}", get(get_invitee))
        .route("/organization_memberships", get(list_memberships))
        .route(
            "/organization_memberships/{uuid}",
            get(get_membership).delete(delete_membership),
        )
        .route(
            "/organizations/{org}/invitations",
            get(list_invitations).post(create_invitation),
        )
        .route(
            "/organizations/{org}/invitations/{uuid}",
            get(get_invitation).delete(delete_invitation),
        )
        .route("/scheduling_links", post(create_scheduling_link))
        .route(
            "/webhook_subscriptions",
            get(list_webhook_subscriptions).post(create_webhook_subscription),
        )
        .route(
            "/webhook_subscriptions/{uuid}",
            get(get_webhook_subscription).delete(delete_webhook_subscription),
        )
        .route_layer(middleware::from_fn_with_state(db.clone(), require_token))
        .route("/oauth/token", post(issue_token))
        .route("/oauth/introspect", post(introspect_token))
        .route("/oauth/revoke", post(revoke_token))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_token(State(db): State<Db>, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    let known = match token {
        Some(token) => db.read().await.tokens.contains_key(&token),
        None => false,
    };
    if !known {
        return Failure::unauthenticated().into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// OAuth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub grant_type: String,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenActionRequest {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub token: String,
}

#[derive(Debug, Serialize)]
struct IntrospectBody {
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
}

fn check_client(client_id: &str) -> ApiResult<()> {
    if client_id != CLIENT_ID {
        return Err(Failure::oauth(
            StatusCode::UNAUTHORIZED,
            "invalid_client",
            "Client authentication failed due to unknown client.",
        ));
    }
    Ok(())
}

async fn issue_token(
    State(db): State<Db>,
    Json(input): Json<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    check_client(&input.client_id)?;
    let mut store = db.write().await;

    match input.grant_type.as_str() {
        "authorization_code" => match input.code.as_deref() {
            Some(code) if !code.is_empty() && code != "expired" => {}
            _ => {
                return Err(Failure::oauth(
                    StatusCode::BAD_REQUEST,
                    "invalid_grant",
                    "The provided authorization grant is invalid, expired or revoked.",
                ))
            }
        },
        "refresh_token" => {
            let refresh = input.refresh_token.as_deref().unwrap_or_default();
            let previous = store
                .tokens
                .iter()
                .find(|(_, issued)| issued.refresh_token == refresh)
                .map(|(access, _)| access.clone())
                .ok_or_else(|| {
                    Failure::oauth(
                        StatusCode::BAD_REQUEST,
                        "invalid_grant",
                        "The provided authorization grant is invalid, expired or revoked.",
                    )
                })?;
            store.tokens.remove(&previous);
        }
        _ => {
            return Err(Failure::oauth(
                StatusCode::BAD_REQUEST,
                "unsupported_grant_type",
                "The authorization grant type is not supported.",
            ))
        }
    }

    let issued = IssuedToken {
        refresh_token: format!("refresh-{}", Uuid::new_v4().simple()),
        created_at: Utc::now().timestamp(),
        expires_in: 7200,
    };
    let access_token = format!("access-{}", Uuid::new_v4().simple());
    store.tokens.insert(access_token.clone(), issued.clone());
    info!(grant_type = %input.grant_type, "mock_token_issued");

    Ok(Json(TokenResponse {
        token_type: "Bearer".to_string(),
        access_token,
        refresh_token: issued.refresh_token,
        scope: "default".to_string(),
        created_at: issued.created_at,
        expires_in: issued.expires_in,
        owner: seed::owner_uri(),
        organization: seed::organization_uri(),
    }))
}

async fn introspect_token(
    State(db): State<Db>,
    Json(input): Json<TokenActionRequest>,
) -> ApiResult<Json<IntrospectBody>> {
    check_client(&input.client_id)?;
    let store = db.read().await;
    let body = match store.tokens.get(&input.token) {
        Some(issued) => IntrospectBody {
            active: true,
            client_id: Some(input.client_id),
            exp: Some(issued.created_at + issued.expires_in as i64),
            iat: Some(issued.created_at),
            organization: Some(seed::organization_uri()),
            owner: Some(seed::owner_uri()),
            scope: Some("default".to_string()),
            token_type: Some("Bearer".to_string()),
        },
        None => IntrospectBody {
            active: false,
            client_id: None,
            exp: None,
            iat: None,
            organization: None,
            owner: None,
            scope: None,
            token_type: None,
        },
    };
    Ok(Json(body))
}

/// Revokes by access or refresh token. Unknown tokens still succeed.
async fn revoke_token(
    State(db): State<Db>,
    Json(input): Json<TokenActionRequest>,
) -> ApiResult<StatusCode> {
    check_client(&input.client_id)?;
    let mut store = db.write().await;
    store
        .tokens
        .retain(|access, issued| *access != input.token && issued.refresh_token != input.token);
    info!("mock_token_revoked");
    Ok(StatusCode::OK)
}

// ---------------------------------------------------------------------------
// Users and event types
// ---------------------------------------------------------------------------

async fn get_me(State(db): State<Db>) -> ApiResult<Json<Resource<User>>> {
    get_user(State(db), Path(OWNER_UUID.to_string())).await
}

async fn get_user(State(db): State<Db>, Path(uuid): Path<String>) -> ApiResult<Json<Resource<User>>> {
    let store = db.read().await;
    store
        .users
        .iter()
        .find(|u| uuid_of(&u.uri) == uuid)
        .cloned()
        .map(resource)
        .ok_or_else(Failure::not_found)
}

#[derive(Debug, Default, Deserialize)]
pub struct EventTypeQuery {
    pub user: Option<String>,
    pub organization: Option<String>,
    pub count: Option<usize>,
    pub page_token: Option<String>,
    pub sort: Option<String>,
}

async fn list_event_types(
    State(db): State<Db>,
    Query(query): Query<EventTypeQuery>,
) -> ApiResult<Json<Collection<EventType>>> {
    require_user_or_organization(query.user.as_deref(), query.organization.as_deref())?;
    let store = db.read().await;
    let mut items: Vec<EventType> = store
        .event_types
        .iter()
        .filter(|e| match &query.user {
            Some(user) => e.profile.as_ref().is_some_and(|p| &p.owner == user),
            None => true,
        })
        .cloned()
        .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    if query.sort.as_deref() == Some("name:desc") {
        items.reverse();
    }
    paginate(items, query.count, query.page_token.as_deref(), "/event_types")
}

async fn get_event_type(
    State(db): State<Db>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<Resource<EventType>>> {
    let store = db.read().await;
    store
        .event_types
        .iter()
        .find(|e| uuid_of(&e.uri) == uuid)
        .cloned()
        .map(resource)
        .ok_or_else(Failure::not_found)
}

// ---------------------------------------------------------------------------
// Scheduled events and invitees
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ScheduledEventQuery {
    pub user: Option<String>,
    pub organization: Option<String>,
    pub count: Option<usize>,
    pub invitee_email: Option<String>,
    pub max_start_time: Option<String>,
    pub min_start_time: Option<String>,
    pub page_token: Option<String>,
    pub sort: Option<String>,
    pub status: Option<String>,
}

async fn list_scheduled_events(
    State(db): State<Db>,
    Query(query): Query<ScheduledEventQuery>,
) -> ApiResult<Json<Collection<ScheduledEvent>>> {
    require_user_or_organization(query.user.as_deref(), query.organization.as_deref())?;
    let min = query
        .min_start_time
        .as_deref()
        .map(|v| parse_time("min_start_time", v))
        .transpose()?;
    let max = query
        .max_start_time
        .as_deref()
        .map(|v| parse_time("max_start_time", v))
        .transpose()?;

    let store = db.read().await;
    let mut items = Vec::new();
    for event in &store.scheduled_events {
        if let Some(user) = &query.user {
            if !event.event_memberships.iter().any(|m| &m.user == user) {
                continue;
            }
        }
        if let Some(status) = &query.status {
            if &event.status != status {
                continue;
            }
        }
        if let Some(email) = &query.invitee_email {
            let has_invitee = store
                .invitees
                .iter()
                .any(|i| i.event == event.uri && &i.email == email);
            if !has_invitee {
                continue;
            }
        }
        let start = parse_time("start_time", &event.start_time)?;
        if min.is_some_and(|min| start < min) || max.is_some_and(|max| start > max) {
            continue;
        }
        items.push(event.clone());
    }
    items.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    if query.sort.as_deref() == Some("start_time:desc") {
        items.reverse();
    }
    paginate(items, query.count, query.page_token.as_deref(), "/scheduled_events")
}

async fn get_scheduled_event(
    State(db): State<Db>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<Resource<ScheduledEvent>>> {
    let store = db.read().await;
    store
        .scheduled_events
        .iter()
        .find(|e| uuid_of(&e.uri) == uuid)
        .cloned()
        .map(resource)
        .ok_or_else(Failure::not_found)
}

#[derive(Debug, Default, Deserialize)]
pub struct InviteeQuery {
    pub count: Option<usize>,
    pub email: Option<String>,
    pub page_token: Option<String>,
    pub sort: Option<String>,
    pub status: Option<String>,
}

async fn list_invitees(
    State(db): State<Db>,
    Path(event_uuid): Path<String>,
    Query(query): Query<InviteeQuery>,
) -> ApiResult<Json<Collection<Invitee>>> {
    let store = db.read().await;
    let event = store
        .scheduled_events
        .iter()
        .find(|e| uuid_of(&e.uri) == event_uuid)
        .ok_or_else(Failure::not_found)?;
    let mut items: Vec<Invitee> = store
        .invitees
        .iter()
        .filter(|i| i.event == event.uri)
        .filter(|i| query.email.as_ref().map_or(true, |email| &i.email == email))
        .filter(|i| query.status.as_ref().map_or(true, |status| &i.status == status))
        .cloned()
        .collect();
    if query.sort.as_deref() == Some("created_at:desc") {
        items.reverse();
    }
    let path = format!("/scheduled_events/{event_uuid}/invitees");
    paginate(items, query.count, query.page_token.as_deref(), &path)
}

async fn get_invitee(
    State(db): State<Db>,
    Path((event_uuid, uuid)): Path<(String, String)>,
) -> ApiResult<Json<Resource<Invitee>>> {
    let store = db.read().await;
    store
        .invitees
        .iter()
        .find(|i| uuid_of(&i.event) == event_uuid && uuid_of(&i.uri) == uuid)
        .cloned()
        .map(resource)
        .ok_or_else(Failure::not_found)
}

// ---------------------------------------------------------------------------
// Organization memberships and invitations
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct MembershipQuery {
    pub organization: Option<String>,
    pub user: Option<String>,
    pub count: Option<usize>,
    pub email: Option<String>,
    pub page_token: Option<String>,
}

async fn list_memberships(
    State(db): State<Db>,
    Query(query): Query<MembershipQuery>,
) -> ApiResult<Json<Collection<OrganizationMembership>>> {
    require_user_or_organization(query.user.as_deref(), query.organization.as_deref())?;
    let store = db.read().await;
    let items: Vec<OrganizationMembership> = store
        .memberships
        .iter()
        .filter(|m| query.user.as_ref().map_or(true, |user| &m.user.uri == user))
        .filter(|m| query.email.as_ref().map_or(true, |email| &m.user.email == email))
        .cloned()
        .collect();
    paginate(items, query.count, query.page_token.as_deref(), "/organization_memberships")
}

async fn get_membership(
    State(db): State<Db>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<Resource<OrganizationMembership>>> {
    let store = db.read().await;
    store
        .memberships
        .iter()
        .find(|m| uuid_of(&m.uri) == uuid)
        .cloned()
        .map(resource)
        .ok_or_else(Failure::not_found)
}

async fn delete_membership(State(db): State<Db>, Path(uuid): Path<String>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let index = store
        .memberships
        .iter()
        .position(|m| uuid_of(&m.uri) == uuid)
        .ok_or_else(Failure::not_found)?;
    if store.memberships[index].role == "owner" {
        return Err(Failure::permission_denied(
            "The owner of an organization cannot be removed.",
        ));
    }
    store.memberships.remove(index);
    info!(membership = %uuid, "mock_membership_deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct InvitationQuery {
    pub count: Option<usize>,
    pub email: Option<String>,
    pub page_token: Option<String>,
    pub sort: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvitation {
    pub email: String,
}

fn check_organization(org: &str) -> ApiResult<()> {
    if org != ORGANIZATION_UUID {
        return Err(Failure::not_found());
    }
    Ok(())
}

async fn list_invitations(
    State(db): State<Db>,
    Path(org): Path<String>,
    Query(query): Query<InvitationQuery>,
) -> ApiResult<Json<Collection<OrganizationInvitation>>> {
    check_organization(&org)?;
    let store = db.read().await;
    let mut items: Vec<OrganizationInvitation> = store
        .invitations
        .iter()
        .filter(|i| query.email.as_ref().map_or(true, |email| &i.email == email))
        .filter(|i| query.status.as_ref().map_or(true, |status| &i.status == status))
        .cloned()
        .collect();
    if query.sort.as_deref() == Some("created_at:desc") {
        items.reverse();
    }
    let path = format!("/organizations/{org}/invitations");
    paginate(items, query.count, query.page_token.as_deref(), &path)
}

async fn create_invitation(
    State(db): State<Db>,
    Path(org): Path<String>,
    Json(input): Json<CreateInvitation>,
) -> ApiResult<(StatusCode, Json<Resource<OrganizationInvitation>>)> {
    check_organization(&org)?;
    if !input.email.contains('@') {
        return Err(Failure::invalid_argument("email", "is invalid"));
    }
    let mut store = db.write().await;
    let already_invited = store
        .invitations
        .iter()
        .any(|i| i.email == input.email && i.status == "pending");
    if already_invited {
        return Err(Failure::invalid_argument("email", "has already been invited"));
    }

    let created_at = now();
    let invitation = OrganizationInvitation {
        uri: format!("{}/invitations/{}", seed::organization_uri(), new_uuid()),
        organization: seed::organization_uri(),
        email: input.email,
        status: "pending".to_string(),
        created_at: created_at.clone(),
        updated_at: created_at.clone(),
        last_sent_at: Some(created_at),
        user: None,
    };
    store.invitations.push(invitation.clone());
    info!(invitation = %invitation.uri, "mock_invitation_created");
    Ok((StatusCode::CREATED, resource(invitation)))
}

async fn get_invitation(
    State(db): State<Db>,
    Path((org, uuid)): Path<(String, String)>,
) -> ApiResult<Json<Resource<OrganizationInvitation>>> {
    check_organization(&org)?;
    let store = db.read().await;
    store
        .invitations
        .iter()
        .find(|i| uuid_of(&i.uri) == uuid)
        .cloned()
        .map(resource)
        .ok_or_else(Failure::not_found)
}

async fn delete_invitation(
    State(db): State<Db>,
    Path((org, uuid)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    check_organization(&org)?;
    let mut store = db.write().await;
    let index = store
        .invitations
        .iter()
        .position(|i| uuid_of(&i.uri) == uuid)
        .ok_or_else(Failure::not_found)?;
    store.invitations.remove(index);
    info!(invitation = %uuid, "mock_invitation_revoked");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Scheduling links
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateSchedulingLink {
    pub max_event_count: u32,
    pub owner: String,
    pub owner_type: String,
}

async fn create_scheduling_link(
    State(db): State<Db>,
    Json(input): Json<CreateSchedulingLink>,
) -> ApiResult<(StatusCode, Json<Resource<SchedulingLink>>)> {
    if input.owner_type != "EventType" {
        return Err(Failure::invalid_argument("owner_type", "must be EventType"));
    }
    if input.max_event_count != 1 {
        return Err(Failure::invalid_argument("max_event_count", "must be 1"));
    }
    let store = db.read().await;
    if !store.event_types.iter().any(|e| e.uri == input.owner) {
        return Err(Failure::invalid_argument("owner", "is not a known event type"));
    }
    let link = SchedulingLink {
        booking_url: format!("https://calendly.com/d/{}", new_uuid().to_lowercase()),
        owner: input.owner,
        owner_type: input.owner_type,
    };
    info!(booking_url = %link.booking_url, "mock_scheduling_link_created");
    Ok((StatusCode::CREATED, resource(link)))
}

// ---------------------------------------------------------------------------
// Webhook subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateWebhookSubscription {
    pub url: String,
    pub events: Vec<String>,
    pub organization: String,
    pub user: Option<String>,
    pub scope: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookSubscriptionQuery {
    pub organization: Option<String>,
    pub scope: Option<String>,
    pub user: Option<String>,
    pub count: Option<usize>,
    pub page_token: Option<String>,
    pub sort: Option<String>,
}

async fn create_webhook_subscription(
    State(db): State<Db>,
    Json(input): Json<CreateWebhookSubscription>,
) -> ApiResult<(StatusCode, Json<Resource<WebhookSubscription>>)> {
    if !input.url.starts_with("https://") && !input.url.starts_with("http://") {
        return Err(Failure::invalid_argument("url", "must be a valid URL"));
    }
    if input.events.is_empty() || input.events.iter().any(|e| !WEBHOOK_EVENTS.contains(&e.as_str())) {
        return Err(Failure::invalid_argument("events", "contains an unsupported event"));
    }
    match input.scope.as_str() {
        "organization" => {}
        "user" if input.user.is_some() => {}
        "user" => return Err(Failure::invalid_argument("user", "is required for user scope")),
        _ => return Err(Failure::invalid_argument("scope", "is invalid")),
    }
    if input.organization != seed::organization_uri() {
        return Err(Failure::permission_denied(
            "You do not have permission to access this organization.",
        ));
    }

    let mut store = db.write().await;
    let duplicate = store
        .webhook_subscriptions
        .iter()
        .any(|w| w.callback_url == input.url && w.scope == input.scope);
    if duplicate {
        return Err(Failure::already_exists("Hook with this url already exists"));
    }

    let created_at = now();
    let subscription = WebhookSubscription {
        uri: format!("{API_URI}/webhook_subscriptions/{}", new_uuid()),
        callback_url: input.url,
        created_at: created_at.clone(),
        updated_at: created_at,
        retry_started_at: None,
        state: "active".to_string(),
        events: input.events,
        scope: input.scope,
        organization: input.organization,
        user: input.user,
        creator: Some(seed::owner_uri()),
    };
    store.webhook_subscriptions.push(subscription.clone());
    info!(subscription = %subscription.uri, "mock_webhook_subscription_created");
    Ok((StatusCode::CREATED, resource(subscription)))
}

async fn list_webhook_subscriptions(
    State(db): State<Db>,
    Query(query): Query<WebhookSubscriptionQuery>,
) -> ApiResult<Json<Collection<WebhookSubscription>>> {
    let organization = query
        .organization
        .as_deref()
        .ok_or_else(|| Failure::invalid_argument("organization", "is required"))?;
    let scope = query
        .scope
        .as_deref()
        .ok_or_else(|| Failure::invalid_argument("scope", "is required"))?;
    let store = db.read().await;
    let mut items: Vec<WebhookSubscription> = store
        .webhook_subscriptions
        .iter()
        .filter(|w| w.organization == organization && w.scope == scope)
        .filter(|w| query.user.is_none() || w.user == query.user)
        .cloned()
        .collect();
    if query.sort.as_deref() == Some("created_at:desc") {
        items.reverse();
    }
    paginate(items, query.count, query.page_token.as_deref(), "/webhook_subscriptions")
}

async fn get_webhook_subscription(
    State(db): State<Db>,
    Path(uuid): Path<String>,
) -> ApiResult<Json<Resource<WebhookSubscription>>> {
    let store = db.read().await;
    store
        .webhook_subscriptions
        .iter()
        .find(|w| uuid_of(&w.uri) == uuid)
        .cloned()
        .map(resource)
        .ok_or_else(Failure::not_found)
}

async fn delete_webhook_subscription(
    State(db): State<Db>,
    Path(uuid): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let index = store
        .webhook_subscriptions
        .iter()
        .position(|w| uuid_of(&w.uri) == uuid)
        .ok_or_else(Failure::not_found)?;
    store.webhook_subscriptions.remove(index);
    info!(subscription = %uuid, "mock_webhook_subscription_deleted");
    Ok(StatusCode::NO_CONTENT)
}
