//! Base URLs the clients build requests against.

use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://api.calendly.com";
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://auth.calendly.com";

/// Where requests are sent. Passed explicitly to every client constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the resource API.
    pub api_base_url: String,

    /// Base URL of the OAuth endpoints.
    pub oauth_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            oauth_base_url: DEFAULT_OAUTH_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Point both the resource API and OAuth endpoints at the same host,
    /// which is how the mock server is laid out.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: trim_base(base_url),
            oauth_base_url: trim_base(base_url),
        }
    }

    /// Load base URLs from `CALENDLY_BASE_URL` and `CALENDLY_OAUTH_BASE_URL`,
    /// falling back to the production hosts.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `from_env` over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = |key: &str, default: &str| {
            lookup(key)
                .map(|v| trim_base(&v))
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            api_base_url: base("CALENDLY_BASE_URL", DEFAULT_API_BASE_URL),
            oauth_base_url: base("CALENDLY_OAUTH_BASE_URL", DEFAULT_OAUTH_BASE_URL),
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
