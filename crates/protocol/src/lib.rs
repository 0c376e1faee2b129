use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reserved name of the built-in package introspection tool.
pub const LIST_TOOL_PACKAGES: &str = "list_tool_packages";

/// Environment variable operators set to pick a tool package.
pub const TOOL_PACKAGE_ENV: &str = "MCP_TOOL_PACKAGE";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    OperationNotFound,
    CapabilityDisabled,
    InvalidArguments,
    ExecutionFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OperationNotFound => "operation_not_found",
            Self::CapabilityDisabled => "capability_disabled",
            Self::InvalidArguments => "invalid_arguments",
            Self::ExecutionFailed => "execution_failed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Payload of the `list_tool_packages` tool.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ToolPackagesReport {
    pub current_package: String,
    pub available_packages: Vec<String>,
    pub message: String,
}

impl ToolPackagesReport {
    pub fn new(current_package: &str, available_packages: Vec<String>) -> Self {
        let message = format!(
            "Currently loaded package: '{current_package}'. Set {TOOL_PACKAGE_ENV} env var to one of {available_packages:?} to switch."
        );
        Self {
            current_package: current_package.to_string(),
            available_packages,
            message,
        }
    }
}

/// Canonical text form: two-space indented JSON.
pub fn serialize_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
