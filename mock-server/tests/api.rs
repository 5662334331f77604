use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{
    app, Collection, EventType, Invitee, OrganizationInvitation, OrganizationMembership, Resource,
    ScheduledEvent, SchedulingLink, TokenResponse, User, WebhookSubscription, CLIENT_ID,
    ORGANIZATION_UUID, SEED_ACCESS_TOKEN, SEED_REFRESH_TOKEN,
};
use serde_json::Value;
use tower::ServiceExt;

const ORGANIZATION_URI: &str = "https://api.calendly.com/organizations/BBBBBBBBBBBBBBBB";
const OWNER_URI: &str = "https://api.calendly.com/users/AAAAAAAAAAAAAAAA";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {SEED_ACCESS_TOKEN}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_token_is_unauthenticated() {
    let resp = app()
        .oneshot(Request::builder().uri("/users/me").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["title"], "Unauthenticated");
}

#[tokio::test]
async fn unknown_token_is_unauthenticated() {
    let req = Request::builder()
        .uri("/users/me")
        .header(http::header::AUTHORIZATION, "Bearer nope")
        .body(String::new())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- oauth ---

#[tokio::test]
async fn token_exchange_issues_bearer_token() {
    let body = format!(
        r#"{{"client_id":"{CLIENT_ID}","grant_type":"authorization_code","code":"abc","redirect_uri":"https://app.example/cb"}}"#
    );
    let resp = app().oneshot(json_request("POST", "/oauth/token", &body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let token: TokenResponse = body_json(resp).await;
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, 7200);
    assert_eq!(token.owner, OWNER_URI);
    assert_eq!(token.organization, ORGANIZATION_URI);
}

#[tokio::test]
async fn token_exchange_rejects_unknown_client() {
    let body = r#"{"client_id":"someone-else","grant_type":"authorization_code","code":"abc"}"#;
    let resp = app().oneshot(json_request("POST", "/oauth/token", body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "invalid_client");
}

#[tokio::test]
async fn refresh_with_unknown_token_is_invalid_grant() {
    let body = format!(
        r#"{{"client_id":"{CLIENT_ID}","grant_type":"refresh_token","refresh_token":"stale"}}"#
    );
    let resp = app().oneshot(json_request("POST", "/oauth/token", &body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "invalid_grant");
}

#[tokio::test]
async fn refresh_rotates_tokens() {
    let app = app();
    let body = format!(
        r#"{{"client_id":"{CLIENT_ID}","grant_type":"refresh_token","refresh_token":"{SEED_REFRESH_TOKEN}"}}"#
    );
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/oauth/token", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // The seeded access token was replaced.
    let resp = app.oneshot(authed("GET", "/users/me", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn introspect_reports_active_and_inactive() {
    let app = app();
    let body = format!(r#"{{"client_id":"{CLIENT_ID}","token":"{SEED_ACCESS_TOKEN}"}}"#);
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/oauth/introspect", &body))
        .await
        .unwrap();
    let active: Value = body_json(resp).await;
    assert_eq!(active["active"], true);
    assert_eq!(active["owner"], OWNER_URI);
    assert!(active["exp"].is_i64());

    let body = format!(r#"{{"client_id":"{CLIENT_ID}","token":"unknown"}}"#);
    let resp = app.oneshot(json_request("POST", "/oauth/introspect", &body)).await.unwrap();
    let inactive: Value = body_json(resp).await;
    assert_eq!(inactive, serde_json::json!({"active": false}));
}

#[tokio::test]
async fn revoke_invalidates_access_token() {
    let app = app();
    let body = format!(r#"{{"client_id":"{CLIENT_ID}","token":"{SEED_ACCESS_TOKEN}"}}"#);
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/oauth/revoke", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());

    let resp = app.oneshot(authed("GET", "/users/me", "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- users and event types ---

#[tokio::test]
async fn me_returns_owner() {
    let resp = app().oneshot(authed("GET", "/users/me", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user: Resource<User> = body_json(resp).await;
    assert_eq!(user.resource.uri, OWNER_URI);
    assert_eq!(user.resource.current_organization, ORGANIZATION_URI);
}

#[tokio::test]
async fn get_unknown_user_returns_404() {
    let resp = app().oneshot(authed("GET", "/users/NOPE", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["title"], "Resource Not Found");
}

#[tokio::test]
async fn list_event_types_requires_owner_filter() {
    let resp = app().oneshot(authed("GET", "/event_types", "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["title"], "Invalid Argument");
    assert_eq!(body["details"][0]["parameter"], "organization");
}

#[tokio::test]
async fn list_event_types_by_user_excludes_team_types() {
    let uri = format!("/event_types?user={OWNER_URI}");
    let resp = app().oneshot(authed("GET", &uri, "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Collection<EventType> = body_json(resp).await;
    assert_eq!(page.collection.len(), 1);
    assert_eq!(page.collection[0].name, "30 Minute Meeting");
}

#[tokio::test]
async fn list_event_types_sorts_by_name_desc() {
    let uri = format!("/event_types?organization={ORGANIZATION_URI}&sort=name:desc");
    let resp = app().oneshot(authed("GET", &uri, "")).await.unwrap();

    let page: Collection<EventType> = body_json(resp).await;
    let names: Vec<&str> = page.collection.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Support Rotation", "30 Minute Meeting"]);
}

// --- scheduled events ---

#[tokio::test]
async fn list_scheduled_events_paginates() {
    let app = app();
    let uri = format!("/scheduled_events?organization={ORGANIZATION_URI}&count=3");
    let resp = app.clone().oneshot(authed("GET", &uri, "")).await.unwrap();

    let first: Collection<ScheduledEvent> = body_json(resp).await;
    assert_eq!(first.collection.len(), 3);
    assert_eq!(first.pagination.next_page_token.as_deref(), Some("3"));

    let uri = format!("/scheduled_events?organization={ORGANIZATION_URI}&count=3&page_token=3");
    let resp = app.oneshot(authed("GET", &uri, "")).await.unwrap();
    let second: Collection<ScheduledEvent> = body_json(resp).await;
    assert_eq!(second.collection.len(), 1);
    assert!(second.pagination.next_page_token.is_none());
    assert_eq!(second.collection[0].location["type"], "outbound_call");
}

#[tokio::test]
async fn page_token_at_usize_max_returns_empty_page() {
    let uri = format!(
        "/scheduled_events?organization={ORGANIZATION_URI}&count=100&page_token={}",
        usize::MAX
    );
    let resp = app().oneshot(authed("GET", &uri, "")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let page: Collection<ScheduledEvent> = body_json(resp).await;
    assert!(page.collection.is_empty());
    assert!(page.pagination.next_page_token.is_none());
}

#[tokio::test]
async fn list_scheduled_events_filters_by_invitee_and_window() {
    let app = app();
    let uri = format!("/scheduled_events?user={OWNER_URI}&invitee_email=alan@example.com");
    let resp = app.clone().oneshot(authed("GET", &uri, "")).await.unwrap();
    let page: Collection<ScheduledEvent> = body_json(resp).await;
    assert_eq!(page.collection.len(), 1);
    assert_eq!(page.collection[0].location["type"], "google_conference");

    let uri = format!(
        "/scheduled_events?user={OWNER_URI}&min_start_time=2024-03-02T00:00:00.000Z&max_start_time=2024-03-03T23:00:00.000Z&sort=start_time:desc"
    );
    let resp = app.oneshot(authed("GET", &uri, "")).await.unwrap();
    let page: Collection<ScheduledEvent> = body_json(resp).await;
    let types: Vec<&str> = page
        .collection
        .iter()
        .map(|e| e.location["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["custom", "google_conference"]);
}

#[tokio::test]
async fn get_scheduled_event_carries_zoom_data() {
    let resp = app()
        .oneshot(authed("GET", "/scheduled_events/EV00000000000001", ""))
        .await
        .unwrap();

    let event: Resource<ScheduledEvent> = body_json(resp).await;
    let location = &event.resource.location;
    assert_eq!(location["type"], "zoom_conference");
    assert_eq!(location["data"]["settings"]["global_dial_in_numbers"][0]["type"], "toll");
}

#[tokio::test]
async fn invitees_are_scoped_to_their_event() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(authed("GET", "/scheduled_events/EV00000000000001/invitees", ""))
        .await
        .unwrap();
    let page: Collection<Invitee> = body_json(resp).await;
    assert_eq!(page.collection.len(), 1);
    assert_eq!(page.collection[0].email, "grace@example.com");

    let resp = app
        .oneshot(authed(
            "GET",
            "/scheduled_events/EV00000000000002/invitees/IN00000000000001",
            "",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- organization ---

#[tokio::test]
async fn owner_membership_cannot_be_deleted() {
    let resp = app()
        .oneshot(authed("DELETE", "/organization_memberships/OM00000000000001", ""))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = body_json(resp).await;
    assert_eq!(body["title"], "Permission Denied");
}

#[tokio::test]
async fn member_membership_delete_then_list() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(authed("DELETE", "/organization_memberships/OM00000000000002", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let uri = format!("/organization_memberships?organization={ORGANIZATION_URI}");
    let resp = app.oneshot(authed("GET", &uri, "")).await.unwrap();
    let page: Collection<OrganizationMembership> = body_json(resp).await;
    assert_eq!(page.collection.len(), 1);
    assert_eq!(page.collection[0].role, "owner");
}

#[tokio::test]
async fn invitation_create_returns_201_and_rejects_duplicates() {
    let app = app();
    let uri = format!("/organizations/{ORGANIZATION_UUID}/invitations");
    let resp = app
        .clone()
        .oneshot(authed("POST", &uri, r#"{"email":"new@example.com"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Resource<OrganizationInvitation> = body_json(resp).await;
    assert_eq!(created.resource.status, "pending");
    assert!(created.resource.last_sent_at.is_some());

    let resp = app
        .oneshot(authed("POST", &uri, r#"{"email":"new@example.com"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invitations_of_unknown_organization_return_404() {
    let resp = app()
        .oneshot(authed("GET", "/organizations/OTHER/invitations", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- scheduling links ---

#[tokio::test]
async fn scheduling_link_requires_known_event_type() {
    let app = app();
    let body = r#"{"max_event_count":1,"owner":"https://api.calendly.com/event_types/ET00000000000001","owner_type":"EventType"}"#;
    let resp = app.clone().oneshot(authed("POST", "/scheduling_links", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let link: Resource<SchedulingLink> = body_json(resp).await;
    assert!(link.resource.booking_url.starts_with("https://calendly.com/d/"));

    let body = r#"{"max_event_count":1,"owner":"https://api.calendly.com/event_types/NOPE","owner_type":"EventType"}"#;
    let resp = app.oneshot(authed("POST", "/scheduling_links", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- webhook subscriptions ---

#[tokio::test]
async fn webhook_subscription_lifecycle() {
    let app = app();
    let body = format!(
        r#"{{"url":"https://hooks.example/calendly","events":["invitee.created"],"organization":"{ORGANIZATION_URI}","scope":"organization"}}"#
    );
    let resp = app
        .clone()
        .oneshot(authed("POST", "/webhook_subscriptions", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Resource<WebhookSubscription> = body_json(resp).await;
    assert_eq!(created.resource.state, "active");
    let uuid = created.resource.uri.rsplit('/').next().unwrap().to_string();

    let resp = app
        .clone()
        .oneshot(authed("POST", "/webhook_subscriptions", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let uri = format!("/webhook_subscriptions?organization={ORGANIZATION_URI}&scope=organization");
    let resp = app.clone().oneshot(authed("GET", &uri, "")).await.unwrap();
    let page: Collection<WebhookSubscription> = body_json(resp).await;
    assert_eq!(page.collection.len(), 1);

    let resp = app
        .clone()
        .oneshot(authed("DELETE", &format!("/webhook_subscriptions/{uuid}"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(authed("GET", &format!("/webhook_subscriptions/{uuid}"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_subscription_rejects_unknown_event() {
    let body = format!(
        r#"{{"url":"https://hooks.example/calendly","events":["routing_form_submission.created"],"organization":"{ORGANIZATION_URI}","scope":"organization"}}"#
    );
    let resp = app()
        .oneshot(authed("POST", "/webhook_subscriptions", &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["details"][0]["parameter"], "events");
}

#[tokio::test]
async fn list_webhook_subscriptions_requires_scope() {
    let uri = format!("/webhook_subscriptions?organization={ORGANIZATION_URI}");
    let resp = app().oneshot(authed("GET", &uri, "")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
