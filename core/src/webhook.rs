//! Webhook signature verification.
//!
//! Calendly signs each delivery with HMAC-SHA256 and sends the result in the
//! `Calendly-Webhook-Signature` header as `t=<timestamp>,v1=<hex digest>`.
//! The signed bytes are the decimal timestamp, a `.`, and the JSON body.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use tracing::warn;

use crate::error::WebhookError;
use crate::invitees::{Invitee, InviteeEntity};
use crate::webhook_subscriptions::WebhookSubscriptionEvent;

type HmacSha256 = Hmac<Sha256>;

/// Name of the request header carrying the signature.
pub const SIGNATURE_HEADER: &str = "Calendly-Webhook-Signature";

/// Verifies webhook deliveries against a shared signing key.
///
/// Holds only immutable configuration, so one instance can be shared across
/// request handlers.
#[derive(Clone)]
pub struct WebhookVerifier {
    signing_key: String,
    tolerance_seconds: u64,
}

impl fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("signing_key", &"<redacted>")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish()
    }
}

/// The two parts of a signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SignatureHeader<'a> {
    timestamp: i64,
    signature: &'a str,
}

impl<'a> SignatureHeader<'a> {
    /// Parse `t=<int>,v1=<hex>`. The keys themselves are not checked; each
    /// component's value is the text between its first and second `=`.
    fn parse(header: &'a str) -> Result<Self, WebhookError> {
        let components: Vec<&str> = header.split(',').collect();
        let [t, v1] = components.as_slice() else {
            return Err(WebhookError::InvalidFormat);
        };

        let timestamp = component_value(t)?;
        let signature = component_value(v1)?;

        let timestamp = timestamp
            .trim()
            .parse::<i64>()
            .map_err(|_| WebhookError::InvalidFormat)?;

        Ok(Self {
            timestamp,
            signature: signature.trim(),
        })
    }
}

fn component_value(component: &str) -> Result<&str, WebhookError> {
    component.split('=').nth(1).ok_or(WebhookError::InvalidFormat)
}

impl WebhookVerifier {
    /// Create a verifier. `tolerance_seconds` is the maximum age a signed
    /// delivery may have when it is verified.
    pub fn new(signing_key: &str, tolerance_seconds: u64) -> Result<Self, WebhookError> {
        if signing_key.is_empty() {
            return Err(WebhookError::MissingSigningKey);
        }
        Ok(Self {
            signing_key: signing_key.to_string(),
            tolerance_seconds,
        })
    }

    pub fn tolerance_seconds(&self) -> u64 {
        self.tolerance_seconds
    }

    /// Verify a deserialized payload against the wall clock.
    ///
    /// The payload is re-serialized with `serde_json`, so it must produce the
    /// body exactly as sent. A `serde_json::Value` parsed from the body does.
    /// A `WebhookPayload` does not: it serializes with camelCase names, so
    /// passing one here always fails with `InvalidSignature`. When the raw
    /// body is at hand prefer `verify_body`.
    pub fn verify<T: Serialize + ?Sized>(&self, header: &str, payload: &T) -> Result<(), WebhookError> {
        self.verify_at(header, payload, Utc::now().timestamp())
    }

    /// `verify` with a caller-supplied clock, in seconds since the epoch.
    pub fn verify_at<T: Serialize + ?Sized>(
        &self,
        header: &str,
        payload: &T,
        now: i64,
    ) -> Result<(), WebhookError> {
        let body =
            serde_json::to_string(payload).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
        self.verify_body_at(header, &body, now)
    }

    /// Verify the raw request body exactly as received.
    pub fn verify_body(&self, header: &str, body: &str) -> Result<(), WebhookError> {
        self.verify_body_at(header, body, Utc::now().timestamp())
    }

    /// `verify_body` with a caller-supplied clock, in seconds since the epoch.
    ///
    /// The signature is checked before freshness: a forged stale delivery is
    /// `InvalidSignature`, only a genuine stale one is `InvalidTolerance`.
    pub fn verify_body_at(&self, header: &str, body: &str, now: i64) -> Result<(), WebhookError> {
        let parsed = SignatureHeader::parse(header).inspect_err(|_| {
            warn!(header_length = header.len(), "webhook_signature_invalid_format");
        })?;

        let expected = self.sign(parsed.timestamp, body)?;
        if !constant_time_compare(&expected, parsed.signature) {
            warn!(
                expected_length = expected.len(),
                actual_length = parsed.signature.len(),
                "webhook_signature_mismatch"
            );
            return Err(WebhookError::InvalidSignature);
        }

        let tolerance = i64::try_from(self.tolerance_seconds).unwrap_or(i64::MAX);
        if parsed.timestamp < now.saturating_sub(tolerance) {
            warn!(
                webhook_time = parsed.timestamp,
                current_time = now,
                tolerance_seconds = self.tolerance_seconds,
                "webhook_signature_stale"
            );
            return Err(WebhookError::InvalidTolerance);
        }

        Ok(())
    }

    /// Verify the raw body, then decode it into a `WebhookPayload`.
    pub fn verify_and_parse(&self, header: &str, body: &str) -> Result<WebhookPayload, WebhookError> {
        self.verify_body(header, body)?;
        parse_payload(body)
    }

    /// Lowercase hex HMAC-SHA256 of `"{timestamp}.{body}"`.
    pub fn sign(&self, timestamp: i64, body: &str) -> Result<String, WebhookError> {
        let mut mac = match HmacSha256::new_from_slice(self.signing_key.as_bytes()) {
            Ok(m) => m,
            Err(_) => {
                warn!("webhook_signature_invalid_key");
                return Err(WebhookError::MissingSigningKey);
            }
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Full header value for `body` signed at `timestamp`.
    pub fn signature_header(&self, timestamp: i64, body: &str) -> Result<String, WebhookError> {
        Ok(format!("t={timestamp},v1={}", self.sign(timestamp, body)?))
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// A decoded webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub event: WebhookSubscriptionEvent,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub payload: Invitee,
}

#[derive(Deserialize)]
struct WebhookPayloadEntity {
    event: WebhookSubscriptionEvent,
    created_at: DateTime<Utc>,
    #[serde(default)]
    created_by: Option<String>,
    payload: InviteeEntity,
}

/// Decode a webhook body. Does not verify it; see `WebhookVerifier`.
pub fn parse_payload(body: &str) -> Result<WebhookPayload, WebhookError> {
    let entity: WebhookPayloadEntity =
        serde_json::from_str(body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
    Ok(WebhookPayload {
        event: entity.event,
        created_at: entity.created_at,
        created_by: entity.created_by,
        payload: entity.payload.into(),
    })
}
