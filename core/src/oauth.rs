//! OAuth token issuance, introspection and revocation.
//!
//! Covers the server-side half of the authorization-code flow: once the
//! front end has obtained a `code`, exchange it for a `Token`, refresh that
//! token, introspect it, or revoke it. Access tokens expire after two hours;
//! refresh tokens live until used. Storing and scheduling refreshes is the
//! caller's business.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::deserialize;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

/// Options for `OAuthClient::build_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOptions {
    pub grant_type: GrantType,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub refresh_token: Option<String>,
}

impl TokenOptions {
    pub fn authorization_code(code: &str, redirect_uri: &str) -> Self {
        Self {
            grant_type: GrantType::AuthorizationCode,
            code: Some(code.to_string()),
            redirect_uri: Some(redirect_uri.to_string()),
            refresh_token: None,
        }
    }

    pub fn refresh(refresh_token: &str) -> Self {
        Self {
            grant_type: GrantType::RefreshToken,
            code: None,
            redirect_uri: None,
            refresh_token: Some(refresh_token.to_string()),
        }
    }
}

/// An issued access token and the context it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_in: u64,
    pub organization: String,
    pub owner: String,
    pub refresh_token: String,
    pub scope: Option<String>,
    pub token_type: String,
}

impl Token {
    /// Value of the `Authorization` header for resource requests.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    /// `None` when `expires_in` does not fit in a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| self.created_at.checked_add_signed(lifetime))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectResponse {
    pub active: bool,
    pub client_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub issued_at: Option<DateTime<Utc>>,
    pub organization: Option<String>,
    pub owner: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

#[derive(Deserialize)]
struct TokenEntity {
    token_type: String,
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    scope: Option<String>,
    created_at: i64,
    expires_in: u64,
    owner: String,
    organization: String,
}

// An inactive token introspects as just `{"active": false}`.
#[derive(Deserialize)]
struct IntrospectResponseEntity {
    active: bool,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Deserialize)]
struct OAuthErrorEntity {
    error: String,
    #[serde(default)]
    error_description: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    grant_type: GrantType,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Serialize)]
struct TokenActionRequest<'a> {
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    token: &'a str,
}

/// Synchronous, stateless client for the OAuth endpoints.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    base_url: String,
    client_id: String,
    client_secret: Option<String>,
}

impl OAuthClient {
    pub fn new(config: &ClientConfig, client_id: &str, client_secret: Option<&str>) -> Self {
        Self {
            base_url: config.oauth_base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.map(str::to_string),
        }
    }

    pub fn build_token(&self, options: &TokenOptions) -> Result<HttpRequest, ApiError> {
        self.post(
            "/oauth/token",
            &TokenRequest {
                client_id: &self.client_id,
                client_secret: self.client_secret.as_deref(),
                code: options.code.as_deref(),
                grant_type: options.grant_type,
                redirect_uri: options.redirect_uri.as_deref(),
                refresh_token: options.refresh_token.as_deref(),
            },
        )
    }

    pub fn build_introspect(&self, token: &str) -> Result<HttpRequest, ApiError> {
        self.post("/oauth/introspect", &self.token_action(token))
    }

    pub fn build_revoke(&self, token: &str) -> Result<HttpRequest, ApiError> {
        self.post("/oauth/revoke", &self.token_action(token))
    }

    pub fn parse_token(&self, response: HttpResponse) -> Result<Token, ApiError> {
        check_oauth_status(&response)?;
        let entity: TokenEntity = deserialize(&response.body)?;
        Ok(Token {
            access_token: entity.access_token,
            created_at: epoch(entity.created_at)?,
            expires_in: entity.expires_in,
            organization: entity.organization,
            owner: entity.owner,
            refresh_token: entity.refresh_token,
            scope: entity.scope,
            token_type: entity.token_type,
        })
    }

    pub fn parse_introspect(&self, response: HttpResponse) -> Result<IntrospectResponse, ApiError> {
        check_oauth_status(&response)?;
        let entity: IntrospectResponseEntity = deserialize(&response.body)?;
        Ok(IntrospectResponse {
            active: entity.active,
            client_id: entity.client_id,
            expires_at: entity.exp.map(epoch).transpose()?,
            issued_at: entity.iat.map(epoch).transpose()?,
            organization: entity.organization,
            owner: entity.owner,
            scope: entity.scope,
            token_type: entity.token_type,
        })
    }

    pub fn parse_revoke(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_oauth_status(&response)
    }

    fn token_action<'a>(&'a self, token: &'a str) -> TokenActionRequest<'a> {
        TokenActionRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.as_deref(),
            token,
        }
    }

    fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let path = format!("{}{path}", self.base_url);
        debug!(path = %path, "oauth_request_built");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}

fn epoch(seconds: i64) -> Result<DateTime<Utc>, ApiError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| ApiError::Deserialization(format!("timestamp out of range: {seconds}")))
}

fn check_oauth_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    debug!(status = response.status, "oauth_request_failed");
    match serde_json::from_str::<OAuthErrorEntity>(&response.body) {
        Ok(entity) => Err(ApiError::OAuth {
            status: response.status,
            error: entity.error,
            error_description: entity.error_description,
        }),
        Err(_) => Err(ApiError::Http {
            status: response.status,
            body: response.body.clone(),
        }),
    }
}
