//! Error types for the Calendly API client.
//!
//! # Design
//! The remote API wraps failures in one of two JSON envelopes: resource
//! endpoints send `{title, message, details}` and the OAuth endpoints send
//! `{error, error_description}`. When the body parses as the expected
//! envelope the fields are surfaced as-is; any other non-2xx response lands
//! in `Http` with the raw status code and body for debugging.
//!
//! Webhook verification and location decoding never touch HTTP, so they get
//! their own enums and callers can branch on them without a catch-all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of the `details` array in a Calendly error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendlyErrorDetail {
    #[serde(default)]
    pub parameter: Option<String>,
    pub message: String,
}

/// Errors returned by the `parse_*` methods of the resource and OAuth clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A resource endpoint rejected the request with its error envelope.
    #[error("HTTP {status} {title}: {message}")]
    Calendly {
        status: u16,
        title: String,
        message: String,
        details: Vec<CalendlyErrorDetail>,
    },

    /// An OAuth endpoint rejected the request with its error envelope.
    #[error("HTTP {status} {error}: {error_description}")]
    OAuth {
        status: u16,
        error: String,
        error_description: String,
    },

    /// The server returned a non-2xx status without a recognizable envelope.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A scheduled event carried a meeting location that could not be decoded.
    #[error(transparent)]
    Location(#[from] LocationError),
}

impl ApiError {
    /// HTTP status of the failed response, when the error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Calendly { status, .. }
            | ApiError::OAuth { status, .. }
            | ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Reasons a webhook delivery is rejected.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The signature header is not of the form `t=<int>,v1=<hex>`.
    #[error("Invalid Format")]
    InvalidFormat,

    /// The recomputed HMAC does not match the one in the header.
    #[error("Invalid Signature")]
    InvalidSignature,

    /// The signature is valid but older than the tolerance window.
    #[error("Invalid Tolerance")]
    InvalidTolerance,

    #[error("webhook signing key must not be empty")]
    MissingSigningKey,

    /// The payload could not be serialized for signing or parsed after it.
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Failures of the meeting location decoder.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("unknown location type: {0}")]
    UnknownLocationType(String),

    #[error("location record has no string `type` field")]
    MissingType,

    #[error("malformed {location_type} location: {message}")]
    Malformed {
        location_type: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_exposed_for_http_failures_only() {
        let err = ApiError::Http {
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());

        let err = ApiError::Deserialization("eof".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }

    #[test]
    fn webhook_errors_render_their_kind() {
        assert_eq!(WebhookError::InvalidFormat.to_string(), "Invalid Format");
        assert_eq!(WebhookError::InvalidSignature.to_string(), "Invalid Signature");
        assert_eq!(WebhookError::InvalidTolerance.to_string(), "Invalid Tolerance");
    }

    #[test]
    fn location_error_converts_into_api_error() {
        let err: ApiError = LocationError::UnknownLocationType("unknown_x".to_string()).into();
        assert_eq!(err.to_string(), "unknown location type: unknown_x");
    }
}
