//! Credential providers for the YouTube Data API.
//!
//! Every YouTube call asks an [`AuthProvider`] for a [`Credential`] right before it is
//! sent, so token refresh and the consent flow stay out of the API client.

mod oauth;

pub use oauth::{ClientSecret, InstalledAppAuth, StoredToken, YOUTUBE_SCOPE};

use crate::error::Result;
use async_trait::async_trait;
use reqwest::RequestBuilder;

/// A credential that can be attached to an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// OAuth access token, sent as `Authorization: Bearer`.
    Bearer(String),
    /// Data API key, sent as the `key` query parameter. Read-only calls only.
    ApiKey(String),
}

impl Credential {
    /// Attach this credential to a request.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::Bearer(token) => request.bearer_auth(token),
            Credential::ApiKey(key) => request.query(&[("key", key)]),
        }
    }
}

/// Trait for credential sources.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Return a credential that is valid right now, refreshing it if needed.
    async fn credential(&self) -> Result<Credential>;
}

/// Fixed API key. Playlist mutations will be rejected by the platform.
pub struct ApiKeyAuth {
    key: String,
}

impl ApiKeyAuth {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl AuthProvider for ApiKeyAuth {
    async fn credential(&self) -> Result<Credential> {
        Ok(Credential::ApiKey(self.key.clone()))
    }
}

/// Fixed bearer token, never refreshed.
pub struct StaticTokenAuth {
    token: String,
}

impl StaticTokenAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn credential(&self) -> Result<Credential> {
        Ok(Credential::Bearer(self.token.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_providers() {
        let key = ApiKeyAuth::new("AIza-test");
        assert_eq!(
            key.credential().await.unwrap(),
            Credential::ApiKey("AIza-test".to_string())
        );

        let token = StaticTokenAuth::new("ya29.test");
        assert_eq!(
            token.credential().await.unwrap(),
            Credential::Bearer("ya29.test".to_string())
        );
    }

    #[test]
    fn test_apply_api_key_as_query() {
        let client = reqwest::Client::new();
        let request = Credential::ApiKey("abc".to_string())
            .apply(client.get("https://example.com/videos"))
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("key=abc"));
    }

    #[test]
    fn test_apply_bearer_header() {
        let client = reqwest::Client::new();
        let request = Credential::Bearer("tok".to_string())
            .apply(client.get("https://example.com/videos"))
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer tok"
        );
    }
}
