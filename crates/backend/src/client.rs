use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::auth::AuthProvider;
use crate::config::BackendConfig;
use crate::error::{clip_body, BackendError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single REST call, with `path` relative to [`BackendConfig::api_url`].
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl BackendRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).json(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).json(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, path).json(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// One JSON round trip against the backend. No retries, no caching.
#[async_trait]
pub trait TableApi: Send + Sync {
    async fn send(&self, request: BackendRequest) -> Result<Value>;
}

pub struct HttpTableApi {
    config: Arc<BackendConfig>,
    auth: Arc<dyn AuthProvider>,
    http: reqwest::Client,
}

impl HttpTableApi {
    pub fn new(config: Arc<BackendConfig>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            config,
            auth,
            http: reqwest::Client::new(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url(), path.trim_start_matches('/'))
    }
}

#[async_trait]
impl TableApi for HttpTableApi {
    async fn send(&self, request: BackendRequest) -> Result<Value> {
        let url = self.url_for(&request.path);
        log::debug!("{:?} {url}", request.method);

        let mut builder = self
            .http
            .request(request.method.as_reqwest(), &url)
            .timeout(self.config.timeout());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in self.auth.headers().await? {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body.as_ref() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: clip_body(&String::from_utf8_lossy(&bytes)),
            });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// The `result` object of a table API response (empty when absent).
pub fn result_object(response: &Value) -> Map<String, Value> {
    response
        .get("result")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// The `result` array of a table API response (empty when absent).
pub fn result_array(response: &Value) -> Vec<Value> {
    response
        .get("result")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// True for 32-character lowercase hex record ids.
pub fn is_sys_id(id: &str) -> bool {
    id.len() == 32 && id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}
