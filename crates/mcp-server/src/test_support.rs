use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use servicenow_backend::{BackendConfig, BackendError, BackendRequest, Method, TableApi};

use crate::tools::OperationContext;

/// In-memory [`TableApi`] answering from canned routes.
///
/// Routes are matched in insertion order on method, path and (optionally) one
/// query pair. Unmatched requests fail with HTTP 404. Every request is recorded.
#[derive(Default)]
pub(crate) struct StubTableApi {
    routes: Vec<Route>,
    requests: Mutex<Vec<BackendRequest>>,
}

struct Route {
    method: Method,
    path: String,
    query: Option<(String, String)>,
    reply: Reply,
}

#[derive(Clone)]
enum Reply {
    Json(Value),
    Status(u16, String),
}

impl StubTableApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, method: Method, path: &str, body: Value) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            query: None,
            reply: Reply::Json(body),
        });
        self
    }

    /// Like [`Self::on`], but only when the request carries `key=value` in its query.
    pub(crate) fn on_query(
        mut self,
        method: Method,
        path: &str,
        (key, value): (&str, &str),
        body: Value,
    ) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            query: Some((key.to_string(), value.to_string())),
            reply: Reply::Json(body),
        });
        self
    }

    pub(crate) fn fail(mut self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            query: None,
            reply: Reply::Status(status, body.to_string()),
        });
        self
    }

    pub(crate) fn requests(&self) -> Vec<BackendRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Wraps the stub into an operation context, keeping a handle for assertions.
    pub(crate) fn into_context(self) -> (OperationContext, Arc<Self>) {
        let stub = Arc::new(self);
        let config = Arc::new(BackendConfig::new("https://example.service-now.com"));
        let api: Arc<dyn TableApi> = stub.clone();
        (OperationContext::new(config, api), stub)
    }

    fn reply_for(&self, request: &BackendRequest) -> Option<Reply> {
        self.routes
            .iter()
            .find(|route| {
                route.method == request.method
                    && route.path == request.path
                    && route.query.as_ref().map_or(true, |(key, value)| {
                        request.query_value(key) == Some(value.as_str())
                    })
            })
            .map(|route| route.reply.clone())
    }
}

#[async_trait]
impl TableApi for StubTableApi {
    async fn send(&self, request: BackendRequest) -> servicenow_backend::Result<Value> {
        let reply = self.reply_for(&request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match reply {
            Some(Reply::Json(body)) => Ok(body),
            Some(Reply::Status(status, body)) => Err(BackendError::Status { status, body }),
            None => Err(BackendError::Status {
                status: 404,
                body: format!("no stub for {:?} {}", request.method, request.path),
            }),
        }
    }
}
