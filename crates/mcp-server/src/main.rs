//! ServiceNow MCP server binary (stdio transport).

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use servicenow_backend::{AuthManager, AuthProvider, HttpTableApi, TableApi};
use servicenow_mcp::{
    build_registry, Cli, Dispatcher, OperationContext, ServiceNowService, SessionState,
};
use servicenow_packages::{load_or_empty, YamlFileSource};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging goes to stderr only; stdout carries the MCP protocol.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .target(env_logger::Target::Stderr)
        .init();

    let auth = cli.auth_config().context("invalid authentication configuration")?;
    let config = Arc::new(cli.backend_config());
    log::info!(
        "Initializing ServiceNow MCP server for instance {} ({} auth)",
        config.instance_url(),
        auth.kind()
    );

    let auth: Arc<dyn AuthProvider> = Arc::new(AuthManager::new(auth));
    let api: Arc<dyn TableApi> = Arc::new(HttpTableApi::new(config.clone(), auth));
    let context = OperationContext::new(config, api);

    let registry = Arc::new(build_registry().context("failed to build tool registry")?);
    log::debug!("Registered {} tools", registry.len());
    let definitions = load_or_empty(&YamlFileSource::new(cli.tool_package_config.clone()));
    let state = Arc::new(SessionState::new(
        registry,
        definitions,
        cli.tool_package.as_deref(),
    ));
    log::info!("Loaded tool package '{}'", state.package().name());

    let service = ServiceNowService::new(Dispatcher::new(state, context));
    let server = service.serve(stdio()).await?;

    server.waiting().await?;

    log::info!("ServiceNow MCP server stopped");
    Ok(())
}
