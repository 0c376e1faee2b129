//! Command-line and environment configuration.
//!
//! Every flag falls back to an environment variable so MCP clients can configure
//! the server through their `env` block alone.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use servicenow_backend::{AuthConfig, BackendConfig, OAuthConfig};

pub const DEFAULT_API_KEY_HEADER: &str = "X-ServiceNow-API-Key";
pub const DEFAULT_TOOL_PACKAGE_CONFIG: &str = "config/tool_packages.yaml";

#[derive(Parser, Debug, Clone)]
#[command(name = "servicenow-mcp")]
#[command(about = "MCP server for ServiceNow", long_about = None)]
#[command(version)]
pub struct Cli {
    /// ServiceNow instance URL, e.g. https://dev12345.service-now.com
    #[arg(long, env = "SERVICENOW_INSTANCE_URL")]
    pub instance_url: String,

    /// Enable debug logging
    #[arg(long, env = "SERVICENOW_DEBUG")]
    pub debug: bool,

    /// Request timeout in seconds
    #[arg(long, env = "SERVICENOW_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Authentication scheme
    #[arg(long, value_enum, env = "SERVICENOW_AUTH_TYPE", default_value_t = AuthType::Basic)]
    pub auth_type: AuthType,

    /// Username (basic auth and OAuth password grant)
    #[arg(long, env = "SERVICENOW_USERNAME")]
    pub username: Option<String>,

    /// Password (basic auth and OAuth password grant)
    #[arg(long, env = "SERVICENOW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// OAuth client ID
    #[arg(long, env = "SERVICENOW_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "SERVICENOW_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth token URL (defaults to <instance>/oauth_token.do)
    #[arg(long, env = "SERVICENOW_TOKEN_URL")]
    pub token_url: Option<String>,

    /// API key
    #[arg(long, env = "SERVICENOW_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Header carrying the API key
    #[arg(long, env = "SERVICENOW_API_KEY_HEADER", default_value = DEFAULT_API_KEY_HEADER)]
    pub api_key_header: String,

    /// Scripted REST resource path used for script execution
    #[arg(long, env = "SCRIPT_EXECUTION_API_RESOURCE_PATH")]
    pub script_execution_api_resource_path: Option<String>,

    /// Tool package to load (defaults to `full`)
    #[arg(long, env = "MCP_TOOL_PACKAGE")]
    pub tool_package: Option<String>,

    /// YAML file with the tool package definitions
    #[arg(long, env = "TOOL_PACKAGE_CONFIG_PATH", default_value = DEFAULT_TOOL_PACKAGE_CONFIG)]
    pub tool_package_config: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AuthType {
    Basic,
    #[value(alias = "OAuth")]
    Oauth,
    #[value(alias = "api_key")]
    ApiKey,
}

impl Cli {
    pub fn backend_config(&self) -> BackendConfig {
        if self.script_execution_api_resource_path.is_none() {
            log::warn!(
                "Script execution API resource path not set (--script-execution-api-resource-path or SCRIPT_EXECUTION_API_RESOURCE_PATH)"
            );
        }
        BackendConfig::new(self.instance_url.as_str())
            .with_timeout(Duration::from_secs(self.timeout))
            .with_script_execution_api_resource_path(
                self.script_execution_api_resource_path.clone(),
            )
    }

    /// Credentials for the selected scheme. Missing pieces are a startup error.
    pub fn auth_config(&self) -> Result<AuthConfig> {
        match self.auth_type {
            AuthType::Basic => {
                let (Some(username), Some(password)) =
                    (non_empty(&self.username), non_empty(&self.password))
                else {
                    bail!(
                        "Username and password are required for basic authentication (--username/SERVICENOW_USERNAME, --password/SERVICENOW_PASSWORD)"
                    );
                };
                Ok(AuthConfig::Basic { username, password })
            }
            AuthType::Oauth => {
                let (Some(client_id), Some(client_secret), Some(username), Some(password)) = (
                    non_empty(&self.client_id),
                    non_empty(&self.client_secret),
                    non_empty(&self.username),
                    non_empty(&self.password),
                ) else {
                    bail!(
                        "Client ID, client secret, username, and password are required for OAuth password grant (--client-id/SERVICENOW_CLIENT_ID, etc.)"
                    );
                };
                let token_url = match non_empty(&self.token_url) {
                    Some(url) => url,
                    None => {
                        let url = format!(
                            "{}/oauth_token.do",
                            self.instance_url.trim().trim_end_matches('/')
                        );
                        log::warn!("OAuth token URL not provided, defaulting to: {url}");
                        url
                    }
                };
                Ok(AuthConfig::OAuth(OAuthConfig {
                    client_id,
                    client_secret,
                    username,
                    password,
                    token_url,
                }))
            }
            AuthType::ApiKey => {
                let Some(api_key) = non_empty(&self.api_key) else {
                    bail!(
                        "API key is required for API key authentication (--api-key or SERVICENOW_API_KEY)"
                    );
                };
                Ok(AuthConfig::ApiKey {
                    api_key,
                    header_name: self.api_key_header.clone(),
                })
            }
        }
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["servicenow-mcp", "--instance-url", "https://dev.service-now.com/"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&["--username", "admin", "--password", "pw"]);
        assert_eq!(cli.timeout, 30);
        assert_eq!(cli.auth_type, AuthType::Basic);
        assert_eq!(cli.api_key_header, DEFAULT_API_KEY_HEADER);
        assert_eq!(
            cli.tool_package_config,
            PathBuf::from(DEFAULT_TOOL_PACKAGE_CONFIG)
        );
        assert_eq!(cli.log_filter(), "info");

        let backend = cli.backend_config();
        assert_eq!(backend.instance_url(), "https://dev.service-now.com");
        assert_eq!(backend.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn basic_auth_requires_both_credentials() {
        let cli = parse(&["--username", "admin"]);
        let err = cli.auth_config().unwrap_err();
        assert!(err.to_string().contains("Username and password"), "{err}");

        let cli = parse(&["--username", "admin", "--password", "pw"]);
        assert_eq!(cli.auth_config().unwrap().kind(), "basic");
    }

    #[test]
    fn oauth_token_url_defaults_to_instance() {
        let cli = parse(&[
            "--auth-type",
            "oauth",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--username",
            "admin",
            "--password",
            "pw",
        ]);
        match cli.auth_config().unwrap() {
            AuthConfig::OAuth(oauth) => assert_eq!(
                oauth.token_url,
                "https://dev.service-now.com/oauth_token.do"
            ),
            other => panic!("unexpected auth {other:?}"),
        }
    }

    #[test]
    fn oauth_requires_client_credentials() {
        let cli = parse(&["--auth-type", "oauth", "--username", "a", "--password", "b"]);
        assert!(cli.auth_config().is_err());
    }

    #[test]
    fn api_key_accepts_snake_case_and_custom_header() {
        let cli = parse(&[
            "--auth-type",
            "api_key",
            "--api-key",
            "k",
            "--api-key-header",
            "X-Key",
        ]);
        match cli.auth_config().unwrap() {
            AuthConfig::ApiKey {
                api_key,
                header_name,
            } => {
                assert_eq!(api_key, "k");
                assert_eq!(header_name, "X-Key");
            }
            other => panic!("unexpected auth {other:?}"),
        }

        let cli = parse(&["--auth-type", "api-key"]);
        assert!(cli.auth_config().is_err());
    }

    #[test]
    fn debug_flag_raises_log_level() {
        let cli = parse(&["--debug", "--tool-package", "read_only"]);
        assert_eq!(cli.log_filter(), "debug");
        assert_eq!(cli.tool_package.as_deref(), Some("read_only"));
    }
}
