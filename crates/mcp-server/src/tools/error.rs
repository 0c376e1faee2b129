use serde_json::{json, Map, Value};
use servicenow_protocol::{ErrorCode, ErrorEnvelope, LIST_TOOL_PACKAGES, TOOL_PACKAGE_ENV};
use servicenow_packages::NONE_PACKAGE;
use thiserror::Error;

/// Per-call failure of the dispatch core. None of these are fatal to the server.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown tool: {name}")]
    OperationNotFound { name: String },

    #[error("Tool '{name}' is not enabled in the current package '{package}'.")]
    CapabilityDisabled { name: String, package: String },

    #[error("Invalid arguments for tool '{name}': {detail}")]
    InvalidArguments {
        name: String,
        detail: String,
        /// Required fields of the input contract, when the schema is available.
        required: Vec<String>,
    },

    #[error("Error during execution of tool '{name}': {cause}")]
    ExecutionFailed { name: String, cause: String },
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OperationNotFound { .. } => ErrorCode::OperationNotFound,
            Self::CapabilityDisabled { .. } => ErrorCode::CapabilityDisabled,
            Self::InvalidArguments { .. } => ErrorCode::InvalidArguments,
            Self::ExecutionFailed { .. } => ErrorCode::ExecutionFailed,
        }
    }

    pub fn tool(&self) -> &str {
        match self {
            Self::OperationNotFound { name }
            | Self::CapabilityDisabled { name, .. }
            | Self::InvalidArguments { name, .. }
            | Self::ExecutionFailed { name, .. } => name,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.code(),
            message: self.to_string(),
            details: Some(self.details()),
            hint: self.hint(),
        }
    }

    fn details(&self) -> Value {
        let mut details = Map::new();
        details.insert("tool".to_string(), json!(self.tool()));
        match self {
            Self::CapabilityDisabled { package, .. } => {
                details.insert("package".to_string(), json!(package));
            }
            Self::InvalidArguments {
                detail, required, ..
            } => {
                if !required.is_empty() {
                    details.insert("required".to_string(), json!(required));
                }
                if let Some(missing) = extract_serde_field(detail, "missing field `") {
                    details.insert("missing".to_string(), json!(missing));
                }
                if let Some(unknown) = extract_serde_field(detail, "unknown field `") {
                    details.insert("unknown".to_string(), json!(unknown));
                }
            }
            Self::OperationNotFound { .. } | Self::ExecutionFailed { .. } => {}
        }
        Value::Object(details)
    }

    fn hint(&self) -> Option<String> {
        match self {
            Self::OperationNotFound { .. } => Some(format!(
                "Call tools/list (or `{LIST_TOOL_PACKAGES}`) to see the tools available in this session."
            )),
            Self::CapabilityDisabled { package, .. } if package == NONE_PACKAGE => Some(format!(
                "No tools are enabled under package '{NONE_PACKAGE}'. Restart the server with {TOOL_PACKAGE_ENV} set to a defined package."
            )),
            Self::CapabilityDisabled { package, .. } => Some(format!(
                "Package '{package}' does not include this tool. Call `{LIST_TOOL_PACKAGES}` to see which packages exist."
            )),
            Self::InvalidArguments { required, .. } if !required.is_empty() => {
                Some(format!("Required: {}.", required.join(", ")))
            }
            Self::InvalidArguments { .. } | Self::ExecutionFailed { .. } => None,
        }
    }
}

fn extract_serde_field(message: &str, prefix: &str) -> Option<String> {
    let start = message.find(prefix)? + prefix.len();
    let rest = &message[start..];
    let end = rest.find('`')?;
    let field = rest[..end].trim();
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}
