use std::collections::HashMap;

use serde_json::json;

use crate::{
    EventMembership, EventType, Invitee, InviteesCounter, IssuedToken, OrganizationInvitation,
    OrganizationMembership, Profile, QuestionAndAnswer, ScheduledEvent, Store, Tracking, User,
    API_URI, MEMBER_UUID, ORGANIZATION_UUID, OWNER_UUID, SEED_ACCESS_TOKEN, SEED_REFRESH_TOKEN,
};

const SEEDED_AT: &str = "2024-01-02T03:04:05.000000Z";

pub(crate) fn organization_uri() -> String {
    format!("{API_URI}/organizations/{ORGANIZATION_UUID}")
}

pub(crate) fn owner_uri() -> String {
    format!("{API_URI}/users/{OWNER_UUID}")
}

fn user(uuid: &str, name: &str, slug: &str, email: &str, timezone: &str) -> User {
    User {
        uri: format!("{API_URI}/users/{uuid}"),
        name: name.to_string(),
        slug: slug.to_string(),
        email: email.to_string(),
        scheduling_url: format!("https://calendly.com/{slug}"),
        timezone: timezone.to_string(),
        avatar_url: None,
        created_at: SEEDED_AT.to_string(),
        updated_at: SEEDED_AT.to_string(),
        current_organization: organization_uri(),
    }
}

fn scheduled_event(uuid: &str, name: &str, start: &str, end: &str, location: serde_json::Value) -> ScheduledEvent {
    ScheduledEvent {
        uri: format!("{API_URI}/scheduled_events/{uuid}"),
        name: name.to_string(),
        status: "active".to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
        event_type: format!("{API_URI}/event_types/ET00000000000001"),
        location,
        invitees_counter: InviteesCounter {
            total: 1,
            active: 1,
            limit: 1,
        },
        created_at: SEEDED_AT.to_string(),
        updated_at: SEEDED_AT.to_string(),
        event_memberships: vec![EventMembership { user: owner_uri() }],
    }
}

fn invitee(event_uuid: &str, uuid: &str, name: &str, email: &str) -> Invitee {
    Invitee {
        uri: format!("{API_URI}/scheduled_events/{event_uuid}/invitees/{uuid}"),
        email: email.to_string(),
        name: name.to_string(),
        status: "active".to_string(),
        questions_and_answers: vec![QuestionAndAnswer {
            question: "What would you like to discuss?".to_string(),
            answer: "Roadmap".to_string(),
            position: 0,
        }],
        timezone: Some("America/New_York".to_string()),
        event: format!("{API_URI}/scheduled_events/{event_uuid}"),
        created_at: SEEDED_AT.to_string(),
        updated_at: SEEDED_AT.to_string(),
        tracking: Tracking {
            utm_campaign: Some("spring".to_string()),
            ..Tracking::default()
        },
        text_reminder_number: None,
        rescheduled: false,
        old_invitee: None,
        new_invitee: None,
        cancel_url: format!("https://calendly.com/cancellations/{uuid}"),
        reschedule_url: format!("https://calendly.com/reschedulings/{uuid}"),
    }
}

impl Store {
    /// One organization with an owner and a member, two event types, and
    /// four scheduled events covering the common location shapes.
    pub(crate) fn seeded() -> Self {
        let owner = user(OWNER_UUID, "Ada Lovelace", "ada", "ada@example.com", "Europe/London");
        let member = user(MEMBER_UUID, "Grace Hopper", "grace", "grace@example.com", "America/New_York");

        let event_types = vec![
            EventType {
                uri: format!("{API_URI}/event_types/ET00000000000001"),
                name: "30 Minute Meeting".to_string(),
                active: true,
                slug: Some("30min".to_string()),
                scheduling_url: "https://calendly.com/ada/30min".to_string(),
                duration: 30,
                kind: "solo".to_string(),
                pooling_type: None,
                event_type_kind: "StandardEventType".to_string(),
                color: "#8247f5".to_string(),
                created_at: SEEDED_AT.to_string(),
                updated_at: SEEDED_AT.to_string(),
                internal_note: None,
                description_plain: Some("Quick sync".to_string()),
                description_html: Some("<p>Quick sync</p>".to_string()),
                profile: Some(Profile {
                    profile_type: "User".to_string(),
                    name: owner.name.clone(),
                    owner: owner.uri.clone(),
                }),
                secret: false,
            },
            EventType {
                uri: format!("{API_URI}/event_types/ET00000000000002"),
                name: "Support Rotation".to_string(),
                active: true,
                slug: Some("support".to_string()),
                scheduling_url: "https://calendly.com/team/support".to_string(),
                duration: 15,
                kind: "solo".to_string(),
                pooling_type: Some("round_robin".to_string()),
                event_type_kind: "StandardEventType".to_string(),
                color: "#17e885".to_string(),
                created_at: SEEDED_AT.to_string(),
                updated_at: SEEDED_AT.to_string(),
                internal_note: Some("Escalations only".to_string()),
                description_plain: None,
                description_html: None,
                profile: Some(Profile {
                    profile_type: "Team".to_string(),
                    name: "Support".to_string(),
                    owner: format!("{API_URI}/teams/TEAM000000000001"),
                }),
                secret: true,
            },
        ];

        let scheduled_events = vec![
            scheduled_event(
                "EV00000000000001",
                "30 Minute Meeting",
                "2024-03-01T10:00:00.000000Z",
                "2024-03-01T10:30:00.000000Z",
                json!({
                    "type": "zoom_conference",
                    "status": "pushed",
                    "join_url": "https://zoom.us/j/123456789",
                    "data": {
                        "id": "123456789",
                        "settings": {
                            "global_dial_in_numbers": [{
                                "number": "+1 646 558 8656",
                                "country": "US",
                                "type": "toll",
                                "city": "New York",
                                "country_name": "US"
                            }]
                        },
                        "extra": {"intl_numbers_url": "https://zoom.us/u/abc"},
                        "password": "s3cret"
                    }
                }),
            ),
            scheduled_event(
                "EV00000000000002",
                "30 Minute Meeting",
                "2024-03-02T10:00:00.000000Z",
                "2024-03-02T10:30:00.000000Z",
                json!({
                    "type": "google_conference",
                    "status": "pushed",
                    "join_url": "https://meet.google.com/abc-defg-hij"
                }),
            ),
            scheduled_event(
                "EV00000000000003",
                "30 Minute Meeting",
                "2024-03-03T10:00:00.000000Z",
                "2024-03-03T10:30:00.000000Z",
                json!({"type": "custom", "location": "Room 101"}),
            ),
            scheduled_event(
                "EV00000000000004",
                "30 Minute Meeting",
                "2024-03-04T10:00:00.000000Z",
                "2024-03-04T10:30:00.000000Z",
                json!({"type": "outbound_call", "location": "+1 555 0100"}),
            ),
        ];

        let invitees = vec![
            invitee("EV00000000000001", "IN00000000000001", "Grace Hopper", "grace@example.com"),
            invitee("EV00000000000002", "IN00000000000002", "Alan Turing", "alan@example.com"),
        ];

        let memberships = vec![
            OrganizationMembership {
                uri: format!("{API_URI}/organization_memberships/OM00000000000001"),
                role: "owner".to_string(),
                user: owner.clone(),
                organization: organization_uri(),
                updated_at: SEEDED_AT.to_string(),
                created_at: SEEDED_AT.to_string(),
            },
            OrganizationMembership {
                uri: format!("{API_URI}/organization_memberships/OM00000000000002"),
                role: "user".to_string(),
                user: member.clone(),
                organization: organization_uri(),
                updated_at: SEEDED_AT.to_string(),
                created_at: SEEDED_AT.to_string(),
            },
        ];

        let invitations = vec![OrganizationInvitation {
            uri: format!("{}/invitations/IV00000000000001", organization_uri()),
            organization: organization_uri(),
            email: "linus@example.com".to_string(),
            status: "pending".to_string(),
            created_at: SEEDED_AT.to_string(),
            updated_at: SEEDED_AT.to_string(),
            last_sent_at: Some(SEEDED_AT.to_string()),
            user: None,
        }];

        let mut tokens = HashMap::new();
        tokens.insert(
            SEED_ACCESS_TOKEN.to_string(),
            IssuedToken {
                refresh_token: SEED_REFRESH_TOKEN.to_string(),
                created_at: 1_704_164_645,
                expires_in: 7200,
            },
        );

        Store {
            users: vec![owner, member],
            event_types,
            scheduled_events,
            invitees,
            memberships,
            invitations,
            webhook_subscriptions: Vec::new(),
            tokens,
        }
    }
}
