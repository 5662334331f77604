//! Stateless HTTP request builder and response parser shared by every
//! resource client.
//!
//! # Design
//! `ResourceClient` holds only a base URL and the `Authorization` header
//! value, and carries no mutable state between calls. Each resource client
//! wraps one and splits every operation into a `build_*` method that produces
//! an `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip, keeping the core
//! deterministic and free of I/O dependencies.
//!
//! Responses come in three shapes: `{resource: E}` for a single object,
//! `{collection: [E], pagination: {...}}` for lists, and an empty body for
//! deletes. Any non-2xx status is relayed as an `ApiError` without retrying.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::form_urlencoded;

use crate::error::{ApiError, CalendlyErrorDetail};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::oauth::Token;
use crate::types::{Page, PaginationEntity};

#[derive(Debug, Clone)]
pub(crate) struct ResourceClient {
    base_url: String,
    authorization: String,
}

impl ResourceClient {
    pub(crate) fn new(base_url: &str, token: &Token) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: token.authorization(),
        }
    }

    pub(crate) fn get(&self, path: &str, query: Query) -> HttpRequest {
        let path = match query.encode() {
            Some(qs) => format!("{}{path}?{qs}", self.base_url),
            None => format!("{}{path}", self.base_url),
        };
        self.request(HttpMethod::Get, path, None)
    }

    pub(crate) fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(HttpMethod::Post, format!("{}{path}", self.base_url), Some(body)))
    }

    pub(crate) fn delete(&self, path: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("{}{path}", self.base_url), None)
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        debug!(method = method.as_str(), path = %path, "calendly_request_built");
        let mut headers = vec![("authorization".to_string(), self.authorization.clone())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path,
            headers,
            body,
        }
    }
}

/// Query string builder that drops absent options.
#[derive(Debug, Default)]
pub(crate) struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn opt<V: ToString>(mut self, key: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    fn encode(&self) -> Option<String> {
        if self.pairs.is_empty() {
            return None;
        }
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            serializer.append_pair(key, value);
        }
        Some(serializer.finish())
    }
}

#[derive(Deserialize)]
struct ResourceEnvelope<E> {
    resource: E,
}

#[derive(Deserialize)]
struct CollectionEnvelope<E> {
    collection: Vec<E>,
    pagination: PaginationEntity,
}

#[derive(Deserialize)]
struct CalendlyErrorEntity {
    title: String,
    message: String,
    #[serde(default)]
    details: Vec<CalendlyErrorDetail>,
}

/// Parse a `{resource: E}` body and map the entity to its domain type.
pub(crate) fn parse_resource<E, T, F>(response: HttpResponse, map: F) -> Result<T, ApiError>
where
    E: DeserializeOwned,
    F: FnOnce(E) -> Result<T, ApiError>,
{
    check_status(&response)?;
    let envelope: ResourceEnvelope<E> = deserialize(&response.body)?;
    map(envelope.resource)
}

/// Parse a `{collection, pagination}` body, mapping each entity in order.
pub(crate) fn parse_collection<E, T, F>(response: HttpResponse, map: F) -> Result<Page<T>, ApiError>
where
    E: DeserializeOwned,
    F: FnMut(E) -> Result<T, ApiError>,
{
    check_status(&response)?;
    let envelope: CollectionEnvelope<E> = deserialize(&response.body)?;
    Ok(Page {
        collection: envelope
            .collection
            .into_iter()
            .map(map)
            .collect::<Result<_, _>>()?,
        pagination: envelope.pagination.into(),
    })
}

pub(crate) fn parse_empty(response: HttpResponse) -> Result<(), ApiError> {
    check_status(&response)
}

pub(crate) fn deserialize<E: DeserializeOwned>(body: &str) -> Result<E, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    debug!(status = response.status, "calendly_request_failed");
    match serde_json::from_str::<CalendlyErrorEntity>(&response.body) {
        Ok(entity) => Err(ApiError::Calendly {
            status: response.status,
            title: entity.title,
            message: entity.message,
            details: entity.details,
        }),
        Err(_) => Err(ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::oauth::Token;
    use chrono::{TimeZone, Utc};

    pub(crate) fn token() -> Token {
        Token {
            access_token: "access-123".to_string(),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            expires_in: 7200,
            organization: "https://api.calendly.com/organizations/ORG".to_string(),
            owner: "https://api.calendly.com/users/USER".to_string(),
            refresh_token: "refresh-456".to_string(),
            scope: None,
            token_type: "Bearer".to_string(),
        }
    }

    pub(crate) fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn client() -> ResourceClient {
        ResourceClient::new("http://localhost:3000/", &token())
    }

    #[test]
    fn get_carries_authorization_and_no_body() {
        let req = client().get("/users/me", Query::new());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/users/me");
        assert_eq!(req.header("Authorization"), Some("Bearer access-123"));
        assert!(req.header("content-type").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn query_skips_absent_values_and_encodes() {
        let query = Query::new()
            .opt("user", Some("https://api.calendly.com/users/U"))
            .opt::<u32>("count", None)
            .opt("sort", Some("name:asc"));
        let req = client().get("/event_types", query);
        assert_eq!(
            req.path,
            "http://localhost:3000/event_types?user=https%3A%2F%2Fapi.calendly.com%2Fusers%2FU&sort=name%3Aasc"
        );
    }

    #[test]
    fn post_serializes_json_body() {
        #[derive(Serialize)]
        struct Body {
            email: &'static str,
        }
        let req = client().post("/invitations", &Body { email: "a@b.c" }).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(r#"{"email":"a@b.c"}"#));
    }

    #[test]
    fn error_envelope_is_relayed() {
        let body = r#"{"title":"Invalid Argument","message":"The supplied parameters are invalid.","details":[{"parameter":"user","message":"must be a valid URI"}]}"#;
        let err = parse_empty(response(400, body)).unwrap_err();
        match err {
            ApiError::Calendly {
                status,
                title,
                details,
                ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(title, "Invalid Argument");
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].parameter.as_deref(), Some("user"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_without_envelope_keeps_raw_body() {
        let err = parse_empty(response(502, "bad gateway")).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 502, ref body } if body == "bad gateway"));
    }

    #[test]
    fn bad_json_is_a_deserialization_error() {
        let err = parse_resource(response(200, "not json"), |e: serde_json::Value| Ok(e)).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn collection_mapping_short_circuits_on_error() {
        let body = r#"{"collection":[1,2,3],"pagination":{"count":3,"next_page":null}}"#;
        let err = parse_collection(response(200, body), |n: u32| {
            if n == 2 {
                Err(ApiError::Deserialization("two".to_string()))
            } else {
                Ok(n)
            }
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(ref m) if m == "two"));
    }
}
