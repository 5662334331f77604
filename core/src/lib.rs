//! Synchronous API client core for the Calendly v2 API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - Resource clients hold only a base URL and the `Authorization` value.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - Wire entities mirror the remote snake_case JSON and stay private; the
//!   public domain types serialize as camelCase.
//! - Meeting locations are decoded by their `type` discriminant into
//!   `MeetingLocation`; see `location`.
//! - `WebhookVerifier` checks `Calendly-Webhook-Signature` headers.

mod client;
pub mod config;
pub mod error;
pub mod event_types;
pub mod http;
pub mod invitees;
pub mod location;
pub mod oauth;
pub mod organization_invitations;
pub mod organization_memberships;
pub mod scheduled_events;
pub mod scheduling_links;
pub mod types;
pub mod users;
pub mod webhook;
pub mod webhook_subscriptions;

pub use config::ClientConfig;
pub use error::{ApiError, CalendlyErrorDetail, LocationError, WebhookError};
pub use event_types::{EventType, EventTypeOptions, EventTypesClient};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use invitees::{Invitee, InviteeOptions, ScheduledEventInviteesClient};
pub use location::{decode_location, ConferenceStatus, LocationType, MeetingLocation};
pub use oauth::{IntrospectResponse, OAuthClient, Token, TokenOptions};
pub use organization_invitations::{
    OrganizationInvitation, OrganizationInvitationCreateOptions, OrganizationInvitationOptions,
    OrganizationInvitationsClient,
};
pub use organization_memberships::{
    OrganizationMembership, OrganizationMembershipOptions, OrganizationMembershipsClient,
};
pub use scheduled_events::{ScheduledEvent, ScheduledEventOptions, ScheduledEventsClient};
pub use scheduling_links::{SchedulingLink, SchedulingLinkCreateOptions, SchedulingLinksClient};
pub use types::{CreatedAtSort, Page, Pagination};
pub use users::{User, UsersClient};
pub use webhook::{parse_payload, WebhookPayload, WebhookVerifier, SIGNATURE_HEADER};
pub use webhook_subscriptions::{
    WebhookSubscription, WebhookSubscriptionCreateOptions, WebhookSubscriptionEvent,
    WebhookSubscriptionOptions, WebhookSubscriptionScope, WebhookSubscriptionsClient,
};
