//! `list_tool_packages`: the built-in tool reporting the active package.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use servicenow_protocol::{ToolPackagesReport, LIST_TOOL_PACKAGES};

use super::dispatch::{SessionState, ToolListing};
use super::registry::{input_schema_for, JsonObject};

pub(crate) const DESCRIPTION: &str =
    "Lists available tool packages and the currently loaded one.";

/// Input of `list_tool_packages`. Some MCP clients cannot call a tool without
/// arguments, so a placeholder is accepted and ignored.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListToolPackagesParams {
    /// Dummy parameter for no-parameter tools
    #[serde(default)]
    #[allow(dead_code)]
    pub random_string: Option<String>,
}

/// Checks `args` against [`ListToolPackagesParams`]; the values themselves are unused.
pub(crate) fn validate(args: JsonObject) -> serde_json::Result<()> {
    serde_json::from_value::<ListToolPackagesParams>(Value::Object(args)).map(|_| ())
}

pub(crate) fn listing() -> anyhow::Result<ToolListing> {
    Ok(ToolListing {
        name: LIST_TOOL_PACKAGES.to_string(),
        description: DESCRIPTION.to_string(),
        input_schema: input_schema_for::<ListToolPackagesParams>()?,
    })
}

pub(crate) fn report(state: &SessionState) -> ToolPackagesReport {
    ToolPackagesReport::new(state.package().name(), state.definitions().names())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_argument_is_optional() {
        let listing = listing().unwrap();
        assert_eq!(listing.name, "list_tool_packages");
        assert!(listing.input_schema["properties"]
            .get("random_string")
            .is_some());
        let required = listing
            .input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        assert_eq!(required, 0);
    }

    #[test]
    fn placeholder_must_be_a_string_when_given() {
        let args = |value: Value| value.as_object().cloned().unwrap();
        assert!(validate(args(json!({}))).is_ok());
        assert!(validate(args(json!({"random_string": "x", "extra": 1}))).is_ok());
        assert!(validate(args(json!({"random_string": 5}))).is_err());
    }
}
