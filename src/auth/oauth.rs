//! Installed-application OAuth flow with an on-disk token cache.

use super::{AuthProvider, Credential};
use crate::error::{Result, TubenotesError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Full read/write access to the user's YouTube account.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are treated as expired this many seconds early.
const EXPIRY_SKEW_SECS: i64 = 60;

/// One entry of a Google client secrets file.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Read a `client_secrets.json` as downloaded from the Google console.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TubenotesError::Auth(format!(
                "Cannot read client secrets at {}: {}",
                path.display(),
                e
            ))
        })?;
        let file: ClientSecretsFile = serde_json::from_str(&content)?;
        file.installed.or(file.web).ok_or_else(|| {
            TubenotesError::Auth(format!(
                "{} has neither an \"installed\" nor a \"web\" section",
                path.display()
            ))
        })
    }

    /// Build the consent URL the user opens in a browser.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<String> {
        let url = url::Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", YOUTUBE_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| TubenotesError::Auth(format!("Invalid auth_uri: {}", e)))?;
        Ok(url.into())
    }
}

/// A cached, refreshable credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    pub expires_at: i64,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl StoredToken {
    /// Whether the access token can still be used at `now` (unix seconds).
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - EXPIRY_SKEW_SECS > now
    }

    fn from_response(response: TokenResponse, previous_refresh: Option<String>, now: i64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: now + response.expires_in.unwrap_or(3600),
            scopes: response
                .scope
                .map(|s| s.split_whitespace().map(String::from).collect())
                .unwrap_or_else(|| vec![YOUTUBE_SCOPE.to_string()]),
        }
    }

    /// Read a token cache file, returning None if it is missing or unreadable.
    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                warn!("Ignoring unreadable token cache {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the token cache atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        file.persist(path).map_err(|e| TubenotesError::Io(e.error))?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

/// OAuth for an installed application.
///
/// Order of preference: cached token, refresh with the cached refresh token, then the
/// interactive consent flow on a loopback port. Every new token is written back to the cache.
pub struct InstalledAppAuth {
    http: reqwest::Client,
    client_secrets_path: PathBuf,
    token_path: PathBuf,
    port: u16,
    cached: Mutex<Option<StoredToken>>,
}

impl InstalledAppAuth {
    pub fn new(
        http: reqwest::Client,
        client_secrets_path: PathBuf,
        token_path: PathBuf,
        port: u16,
    ) -> Self {
        Self {
            http,
            client_secrets_path,
            token_path,
            port,
            cached: Mutex::new(None),
        }
    }

    /// Whether either the token cache or the client secrets exist on disk.
    pub fn is_configured(&self) -> bool {
        self.token_path.exists() || self.client_secrets_path.exists()
    }

    #[instrument(skip(self, secret, refresh_token))]
    async fn refresh(&self, secret: &ClientSecret, refresh_token: &str) -> Result<StoredToken> {
        info!("Refreshing YouTube access token");
        let response = self
            .http
            .post(&secret.token_uri)
            .form(&[
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let token = Self::parse_token_response(response).await?;
        Ok(StoredToken::from_response(
            token,
            Some(refresh_token.to_string()),
            chrono::Utc::now().timestamp(),
        ))
    }

    #[instrument(skip(self, secret))]
    async fn consent(&self, secret: &ClientSecret) -> Result<StoredToken> {
        let redirect_uri = format!("http://localhost:{}/", self.port);
        let state = uuid::Uuid::new_v4().to_string();
        let auth_url = secret.authorization_url(&redirect_uri, &state)?;

        let listener = TcpListener::bind(("127.0.0.1", self.port)).await.map_err(|e| {
            TubenotesError::Auth(format!("Cannot listen on port {}: {}", self.port, e))
        })?;

        eprintln!("Please visit this URL to authorize this application:\n{}\n", auth_url);

        let (mut stream, _) = listener.accept().await?;
        let mut buf = vec![0u8; 8192];
        let n = stream.read(&mut buf).await?;
        let request = String::from_utf8_lossy(&buf[..n]);
        let request_line = request.lines().next().unwrap_or_default();

        let outcome = parse_redirect(request_line, &state);
        let body = match &outcome {
            Ok(_) => "The authentication flow has completed. You may close this window.",
            Err(_) => "Authorization failed. Check the terminal for details.",
        };
        let reply = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        if let Err(e) = stream.write_all(reply.as_bytes()).await {
            debug!("Failed to answer consent redirect: {}", e);
        }
        let code = outcome?;

        let response = self
            .http
            .post(&secret.token_uri)
            .form(&[
                ("code", code.as_str()),
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let token = Self::parse_token_response(response).await?;
        Ok(StoredToken::from_response(
            token,
            None,
            chrono::Utc::now().timestamp(),
        ))
    }

    async fn parse_token_response(response: reqwest::Response) -> Result<TokenResponse> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TubenotesError::Auth(format!(
                "Token endpoint returned {}: {}",
                status, text
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl AuthProvider for InstalledAppAuth {
    async fn credential(&self) -> Result<Credential> {
        let mut cached = self.cached.lock().await;
        if cached.is_none() {
            *cached = StoredToken::load(&self.token_path);
        }

        let now = chrono::Utc::now().timestamp();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(Credential::Bearer(token.access_token.clone()));
        }

        let secret = ClientSecret::load(&self.client_secrets_path)?;

        let refreshed = match cached.as_ref().and_then(|t| t.refresh_token.clone()) {
            Some(refresh_token) => match self.refresh(&secret, &refresh_token).await {
                Ok(token) => Some(token),
                Err(e) => {
                    warn!("Token refresh failed, falling back to consent flow: {}", e);
                    None
                }
            },
            None => None,
        };

        let token = match refreshed {
            Some(token) => token,
            None => self.consent(&secret).await?,
        };

        if let Err(e) = token.save(&self.token_path) {
            warn!("Failed to write token cache {}: {}", self.token_path.display(), e);
        }

        let credential = Credential::Bearer(token.access_token.clone());
        *cached = Some(token);
        Ok(credential)
    }
}

/// Extract the authorization code from the redirect's request line
/// (`GET /?state=..&code=.. HTTP/1.1`).
fn parse_redirect(request_line: &str, expected_state: &str) -> Result<String> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| TubenotesError::Auth("Malformed redirect request".to_string()))?;

    let url = url::Url::parse(&format!("http://localhost{}", target))
        .map_err(|e| TubenotesError::Auth(format!("Malformed redirect target: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(TubenotesError::Auth(format!(
                    "Consent was denied: {}",
                    value
                )))
            }
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(TubenotesError::Auth(
            "State mismatch in consent redirect".to_string(),
        ));
    }

    code.ok_or_else(|| TubenotesError::Auth("Redirect carried no authorization code".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> ClientSecret {
        ClientSecret {
            client_id: "id.apps.googleusercontent.com".to_string(),
            client_secret: "shh".to_string(),
            auth_uri: DEFAULT_AUTH_URI.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }

    #[test]
    fn test_load_installed_client_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client_secrets.json");
        std::fs::write(
            &path,
            r#"{"installed":{"client_id":"abc","client_secret":"def","redirect_uris":["http://localhost"]}}"#,
        )
        .unwrap();

        let secret = ClientSecret::load(&path).unwrap();
        assert_eq!(secret.client_id, "abc");
        assert_eq!(secret.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_authorization_url_carries_scope_and_state() {
        let url = secret()
            .authorization_url("http://localhost:8000/", "xyz")
            .unwrap();
        let parsed = url::Url::parse(&url).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(pairs["scope"], YOUTUBE_SCOPE);
        assert_eq!(pairs["state"], "xyz");
        assert_eq!(pairs["access_type"], "offline");
        assert_eq!(pairs["redirect_uri"], "http://localhost:8000/");
    }

    #[test]
    fn test_parse_redirect() {
        let code = parse_redirect("GET /?state=s1&code=4%2FabcDEF&scope=x HTTP/1.1", "s1").unwrap();
        assert_eq!(code, "4/abcDEF");

        assert!(parse_redirect("GET /?state=other&code=c HTTP/1.1", "s1").is_err());
        assert!(parse_redirect("GET /?error=access_denied&state=s1 HTTP/1.1", "s1").is_err());
        assert!(parse_redirect("GET /?state=s1 HTTP/1.1", "s1").is_err());
        assert!(parse_redirect("", "s1").is_err());
    }

    #[test]
    fn test_token_freshness() {
        let token = StoredToken {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_at: 1_000,
            scopes: vec![],
        };
        assert!(token.is_fresh(900));
        assert!(!token.is_fresh(950));
        assert!(!token.is_fresh(2_000));
    }

    #[test]
    fn test_refresh_keeps_previous_refresh_token() {
        let response = TokenResponse {
            access_token: "new".to_string(),
            expires_in: Some(3599),
            refresh_token: None,
            scope: None,
        };
        let token = StoredToken::from_response(response, Some("r1".to_string()), 100);
        assert_eq!(token.refresh_token.as_deref(), Some("r1"));
        assert_eq!(token.expires_at, 3699);
        assert_eq!(token.scopes, vec![YOUTUBE_SCOPE.to_string()]);
    }

    #[tokio::test]
    async fn test_fresh_cached_token_needs_no_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        StoredToken {
            access_token: "cached".to_string(),
            refresh_token: Some("r".to_string()),
            expires_at: chrono::Utc::now().timestamp() + 3600,
            scopes: vec![YOUTUBE_SCOPE.to_string()],
        }
        .save(&token_path)
        .unwrap();

        let auth = InstalledAppAuth::new(
            reqwest::Client::new(),
            dir.path().join("missing_client_secrets.json"),
            token_path,
            0,
        );

        assert!(auth.is_configured());
        assert_eq!(
            auth.credential().await.unwrap(),
            Credential::Bearer("cached".to_string())
        );
    }

    #[tokio::test]
    async fn test_expired_token_without_secrets_fails() {
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        StoredToken {
            access_token: "stale".to_string(),
            refresh_token: Some("r".to_string()),
            expires_at: 0,
            scopes: vec![],
        }
        .save(&token_path)
        .unwrap();

        let auth = InstalledAppAuth::new(
            reqwest::Client::new(),
            dir.path().join("missing_client_secrets.json"),
            token_path,
            0,
        );

        let err = auth.credential().await.unwrap_err();
        assert!(matches!(err, TubenotesError::Auth(_)));
    }
}
