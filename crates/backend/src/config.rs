use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    instance_url: String,
    timeout: Duration,
    script_execution_api_resource_path: Option<String>,
}

impl BackendConfig {
    pub fn new(instance_url: impl Into<String>) -> Self {
        let instance_url = instance_url.into().trim().trim_end_matches('/').to_string();
        Self {
            instance_url,
            timeout: DEFAULT_TIMEOUT,
            script_execution_api_resource_path: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_script_execution_api_resource_path(mut self, path: Option<String>) -> Self {
        self.script_execution_api_resource_path = path.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Base of the REST API (`<instance>/api/now`).
    pub fn api_url(&self) -> String {
        format!("{}/api/now", self.instance_url)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn script_execution_api_resource_path(&self) -> Option<&str> {
        self.script_execution_api_resource_path.as_deref()
    }
}
