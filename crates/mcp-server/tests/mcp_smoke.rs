use anyhow::{Context, Result};
use rmcp::model::{CallToolRequestParam, CallToolResult};
use rmcp::service::{RoleClient, RunningService};
use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;

use support::{server_command, start, PACKAGES_YAML};

fn packages_file(text: &str) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new().context("temp packages file")?;
    file.write_all(text.as_bytes())?;
    Ok(file)
}

async fn call(
    service: &RunningService<RoleClient, ()>,
    name: &str,
    args: Value,
) -> Result<CallToolResult> {
    tokio::time::timeout(
        Duration::from_secs(10),
        service.call_tool(CallToolRequestParam {
            name: name.to_string().into(),
            arguments: args.as_object().cloned(),
        }),
    )
    .await
    .with_context(|| format!("timeout calling {name}"))?
    .with_context(|| format!("call {name}"))
}

fn text(result: &CallToolResult) -> &str {
    result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.as_str())
        .unwrap_or_default()
}

async fn tool_names(service: &RunningService<RoleClient, ()>) -> Result<Vec<String>> {
    let tools = tokio::time::timeout(
        Duration::from_secs(10),
        service.list_tools(Default::default()),
    )
    .await
    .context("timeout listing tools")??;
    Ok(tools.tools.iter().map(|t| t.name.to_string()).collect())
}

#[tokio::test]
async fn read_only_package_gates_listing_and_calls() -> Result<()> {
    let packages = packages_file(PACKAGES_YAML)?;
    let cmd = server_command(
        "https://example.service-now.com",
        packages.path(),
        Some("read_only"),
    )?;
    let service = start(cmd).await?;

    assert_eq!(
        tool_names(&service).await?,
        vec!["list_tool_packages", "list_incidents"]
    );

    let report = call(&service, "list_tool_packages", json!({"random_string": ""})).await?;
    assert_ne!(report.is_error, Some(true));
    let report: Value = serde_json::from_str(text(&report))?;
    assert_eq!(report["current_package"], json!("read_only"));
    assert_eq!(report["available_packages"], json!(["full", "read_only"]));

    let disabled = call(&service, "create_incident", json!({"short_description": "x"})).await?;
    assert_eq!(disabled.is_error, Some(true));
    assert_eq!(
        text(&disabled),
        "Tool 'create_incident' is not enabled in the current package 'read_only'."
    );
    let envelope = disabled
        .structured_content
        .context("missing structured error")?;
    assert_eq!(envelope["error"]["code"], json!("capability_disabled"));

    let unknown = call(&service, "drop_table", json!({})).await?;
    assert_eq!(text(&unknown), "Unknown tool: drop_table");

    service.cancel().await?;
    Ok(())
}

#[tokio::test]
async fn missing_package_file_disables_every_tool() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cmd = server_command(
        "https://example.service-now.com",
        &dir.path().join("absent.yaml"),
        None,
    )?;
    let service = start(cmd).await?;

    assert!(tool_names(&service).await?.is_empty());
    let result = call(&service, "list_tool_packages", json!({})).await?;
    assert_eq!(result.is_error, Some(true));

    service.cancel().await?;
    Ok(())
}

#[tokio::test]
async fn list_incidents_reaches_the_table_api() -> Result<()> {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .and(query_param("sysparm_limit", "5"))
        .and(header("Authorization", "Basic YWRtaW46cHc="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{
                "sys_id": "abc",
                "number": "INC0010001",
                "short_description": "Email down",
                "state": "1",
            }]
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let packages = packages_file(PACKAGES_YAML)?;
    let service = start(server_command(&backend.uri(), packages.path(), None)?).await?;

    let result = call(&service, "list_incidents", json!({"limit": 5})).await?;
    assert_ne!(result.is_error, Some(true), "{}", text(&result));
    let body: Value = serde_json::from_str(text(&result))?;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["incidents"][0]["number"], json!("INC0010001"));

    let invalid = call(&service, "list_incidents", json!({"limit": "five"})).await?;
    assert_eq!(invalid.is_error, Some(true));
    let envelope = invalid.structured_content.context("missing structured error")?;
    assert_eq!(envelope["error"]["code"], json!("invalid_arguments"));

    service.cancel().await?;
    Ok(())
}
