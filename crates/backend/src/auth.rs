use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{clip_body, AuthError};

pub type Headers = BTreeMap<String, String>;

/// Supplies the headers every backend request carries.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn headers(&self) -> Result<Headers, AuthError>;
}

#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub token_url: String,
}

#[derive(Clone)]
pub enum AuthConfig {
    Basic { username: String, password: String },
    OAuth(OAuthConfig),
    ApiKey { api_key: String, header_name: String },
}

impl AuthConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::OAuth(_) => "oauth",
            Self::ApiKey { .. } => "api_key",
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::OAuth(oauth) => f
                .debug_struct("OAuth")
                .field("client_id", &oauth.client_id)
                .field("token_url", &oauth.token_url)
                .finish_non_exhaustive(),
            Self::ApiKey { header_name, .. } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

pub struct AuthManager {
    config: AuthConfig,
    http: reqwest::Client,
    token: Mutex<Option<String>>,
}

impl AuthManager {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            token: Mutex::new(None),
        }
    }

    async fn oauth_token(&self, oauth: &OAuthConfig) -> Result<String, AuthError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        log::debug!("Requesting OAuth token from {}", oauth.token_url);
        let form = [
            ("grant_type", "password"),
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
            ("username", oauth.username.as_str()),
            ("password", oauth.password.as_str()),
        ];
        let response = self
            .http
            .post(&oauth.token_url)
            .form(&form)
            .send()
            .await
            .map_err(AuthError::TokenRequest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenStatus {
                status: status.as_u16(),
                body: clip_body(&body),
            });
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(AuthError::TokenRequest)?
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

fn json_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers.insert("Accept".to_string(), "application/json".to_string());
    headers
}

#[async_trait]
impl AuthProvider for AuthManager {
    async fn headers(&self) -> Result<Headers, AuthError> {
        let mut headers = json_headers();
        match &self.config {
            AuthConfig::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{username}:{password}"));
                headers.insert("Authorization".to_string(), format!("Basic {encoded}"));
            }
            AuthConfig::ApiKey {
                api_key,
                header_name,
            } => {
                headers.insert(header_name.clone(), api_key.clone());
            }
            AuthConfig::OAuth(oauth) => {
                let token = self.oauth_token(oauth).await?;
                headers.insert("Authorization".to_string(), format!("Bearer {token}"));
            }
        }
        Ok(headers)
    }
}

/// Fixed header set; useful for tests and pre-issued tokens.
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders(pub Headers);

#[async_trait]
impl AuthProvider for StaticHeaders {
    async fn headers(&self) -> Result<Headers, AuthError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn basic_auth_encodes_credentials() {
        let manager = AuthManager::new(AuthConfig::Basic {
            username: "admin".to_string(),
            password: "password".to_string(),
        });
        let headers = manager.headers().await.unwrap();
        assert_eq!(
            headers.get("Authorization").map(String::as_str),
            Some("Basic YWRtaW46cGFzc3dvcmQ=")
        );
        assert_eq!(
            headers.get("Accept").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn api_key_uses_configured_header() {
        let manager = AuthManager::new(AuthConfig::ApiKey {
            api_key: "secret".to_string(),
            header_name: "X-ServiceNow-API-Key".to_string(),
        });
        let headers = manager.headers().await.unwrap();
        assert_eq!(
            headers.get("X-ServiceNow-API-Key").map(String::as_str),
            Some("secret")
        );
        assert!(!headers.contains_key("Authorization"));
    }

    #[tokio::test]
    async fn oauth_token_is_fetched_once_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth_token.do"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "tok-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let manager = AuthManager::new(AuthConfig::OAuth(OAuthConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            username: "admin".to_string(),
            password: "password".to_string(),
            token_url: format!("{}/oauth_token.do", server.uri()),
        }));

        for _ in 0..2 {
            let headers = manager.headers().await.unwrap();
            assert_eq!(
                headers.get("Authorization").map(String::as_str),
                Some("Bearer tok-1")
            );
        }
    }

    #[tokio::test]
    async fn oauth_rejection_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad client"))
            .mount(&server)
            .await;

        let manager = AuthManager::new(AuthConfig::OAuth(OAuthConfig {
            client_id: "id".to_string(),
            client_secret: "wrong".to_string(),
            username: "admin".to_string(),
            password: "password".to_string(),
            token_url: format!("{}/oauth_token.do", server.uri()),
        }));

        let err = manager.headers().await.unwrap_err();
        assert!(matches!(err, AuthError::TokenStatus { status: 401, .. }));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = AuthConfig::Basic {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
