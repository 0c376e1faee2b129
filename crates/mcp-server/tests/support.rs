use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use tokio::process::Command;

pub const PACKAGES_YAML: &str = "\
full:
  - create_incident
  - list_incidents
  - get_user
read_only:
  - list_incidents
";

pub fn locate_servicenow_mcp_bin() -> Result<PathBuf> {
    if let Some(path) = option_env!("CARGO_BIN_EXE_servicenow-mcp") {
        return Ok(PathBuf::from(path));
    }

    // `.../target/{debug|release}/deps/<test>` -> `.../target/{debug|release}/servicenow-mcp`
    if let Ok(exe) = std::env::current_exe() {
        if let Some(target_profile_dir) = exe.parent().and_then(|p| p.parent()) {
            let candidate = target_profile_dir.join("servicenow-mcp");
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = manifest_dir
        .ancestors()
        .nth(2)
        .context("failed to resolve repo root from CARGO_MANIFEST_DIR")?;
    for rel in ["target/debug/servicenow-mcp", "target/release/servicenow-mcp"] {
        let candidate = repo_root.join(rel);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    anyhow::bail!(
        "failed to locate servicenow-mcp binary; build with: cargo build -p servicenow-mcp"
    )
}

/// Server command with basic credentials and the given package file.
pub fn server_command(
    instance_url: &str,
    packages: &Path,
    package: Option<&str>,
) -> Result<Command> {
    let mut cmd = Command::new(locate_servicenow_mcp_bin()?);
    for var in [
        "SERVICENOW_AUTH_TYPE",
        "SERVICENOW_DEBUG",
        "SERVICENOW_TOKEN_URL",
        "MCP_TOOL_PACKAGE",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("SERVICENOW_INSTANCE_URL", instance_url);
    cmd.env("SERVICENOW_USERNAME", "admin");
    cmd.env("SERVICENOW_PASSWORD", "pw");
    cmd.env("TOOL_PACKAGE_CONFIG_PATH", packages);
    cmd.env("RUST_LOG", "warn");
    if let Some(package) = package {
        cmd.env("MCP_TOOL_PACKAGE", package);
    }
    Ok(cmd)
}

pub async fn start(cmd: Command) -> Result<RunningService<RoleClient, ()>> {
    let transport = TokioChildProcess::new(cmd).context("spawn mcp server")?;
    let service = tokio::time::timeout(Duration::from_secs(10), ().serve(transport))
        .await
        .context("timeout starting MCP server")??;
    Ok(service)
}
