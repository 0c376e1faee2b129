//! Dispatch core for the ServiceNow MCP server.
//!
//! A [`Dispatcher`] only exists once the registry is built and the tool package
//! is resolved, so every call it serves runs against a fully initialized
//! [`SessionState`]. Neither the state nor the dispatcher is mutated afterwards.

mod service;

use std::any::Any;
use std::sync::Arc;

use servicenow_packages::{resolve, PackageDefinitions, ResolvedPackage};
use servicenow_protocol::LIST_TOOL_PACKAGES;

pub use service::ServiceNowService;

use super::error::DispatchError;
use super::introspection;
use super::output::{normalize, RawOutput};
use super::registry::{JsonObject, Operation, OperationContext, Registry};

const LOG_PREVIEW_CHARS: usize = 500;

/// Process-wide, read-only session state: the registry plus the resolved package.
#[derive(Debug)]
pub struct SessionState {
    registry: Arc<Registry>,
    definitions: PackageDefinitions,
    package: ResolvedPackage,
}

impl SessionState {
    pub fn new(
        registry: Arc<Registry>,
        definitions: PackageDefinitions,
        requested: Option<&str>,
    ) -> Self {
        let package = resolve(requested, &definitions);
        for tool in package.enabled() {
            if !registry.contains(tool) {
                log::debug!(
                    "Package '{}' lists unknown tool '{tool}'; it will not be offered.",
                    package.name()
                );
            }
        }
        Self {
            registry,
            definitions,
            package,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn definitions(&self) -> &PackageDefinitions {
        &self.definitions
    }

    pub fn package(&self) -> &ResolvedPackage {
        &self.package
    }
}

/// One entry of `tools/list`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolListing {
    pub name: String,
    pub description: String,
    pub input_schema: JsonObject,
}

#[derive(Clone)]
pub struct Dispatcher {
    state: Arc<SessionState>,
    context: OperationContext,
}

impl Dispatcher {
    pub fn new(state: Arc<SessionState>, context: OperationContext) -> Self {
        Self { state, context }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Tools callable under the active package, introspection first.
    ///
    /// A tool whose schema cannot be generated is logged and left out; the rest
    /// are still listed.
    pub fn enumerate(&self) -> Vec<ToolListing> {
        let package = self.state.package();
        let mut tools = Vec::new();

        if !package.is_none() {
            match introspection::listing() {
                Ok(listing) => tools.push(listing),
                Err(err) => {
                    log::error!("Failed to generate schema for tool '{LIST_TOOL_PACKAGES}': {err:#}")
                }
            }
        }

        for operation in self.state.registry().iter() {
            if !package.is_enabled(operation.name()) {
                continue;
            }
            match operation.input_schema() {
                Ok(input_schema) => tools.push(ToolListing {
                    name: operation.name().to_string(),
                    description: operation.description().to_string(),
                    input_schema,
                }),
                Err(err) => log::error!(
                    "Failed to generate schema for tool '{}': {err:#}",
                    operation.name()
                ),
            }
        }

        log::debug!(
            "Listing {} tools for package '{}'.",
            tools.len(),
            package.name()
        );
        tools
    }

    /// Runs one tool call and returns its canonical text.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<String, DispatchError> {
        log::info!("Received call_tool request for tool '{name}'");
        let package = self.state.package();

        if name == LIST_TOOL_PACKAGES {
            if package.is_none() {
                return Err(self.disabled(name));
            }
            introspection::validate(arguments.unwrap_or_default()).map_err(|err| {
                log::warn!("Invalid arguments for tool '{name}': {err}");
                DispatchError::InvalidArguments {
                    name: name.to_string(),
                    detail: err.to_string(),
                    required: Vec::new(),
                }
            })?;
            let report = introspection::report(&self.state);
            return Ok(normalize(name, &RawOutput::record(report)));
        }

        let operation = self.state.registry().lookup(name)?;
        if !package.is_enabled(name) {
            return Err(self.disabled(name));
        }

        let execution = operation
            .prepare(self.context.clone(), arguments.unwrap_or_default())
            .map_err(|err| {
                log::warn!("Invalid arguments for tool '{name}': {err}");
                DispatchError::InvalidArguments {
                    name: name.to_string(),
                    detail: err.to_string(),
                    required: required_fields(operation),
                }
            })?;

        let raw = match tokio::spawn(execution).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => return Err(execution_failed(name, format!("{err:#}"))),
            Err(join_err) if join_err.is_panic() => {
                return Err(execution_failed(name, panic_message(join_err.into_panic())))
            }
            Err(join_err) => return Err(execution_failed(name, join_err.to_string())),
        };

        if !operation.output_shape().accepts(&raw) {
            log::debug!(
                "Tool '{name}' declared {:?} output but returned {}",
                operation.output_shape(),
                raw.kind()
            );
        }

        let text = normalize(name, &raw);
        log::debug!(
            "Serialized value for tool '{name}': {}",
            preview(&text, LOG_PREVIEW_CHARS)
        );
        Ok(text)
    }

    fn disabled(&self, name: &str) -> DispatchError {
        DispatchError::CapabilityDisabled {
            name: name.to_string(),
            package: self.state.package().name().to_string(),
        }
    }
}

fn execution_failed(name: &str, cause: String) -> DispatchError {
    log::error!("Error executing tool '{name}': {cause}");
    DispatchError::ExecutionFailed {
        name: name.to_string(),
        cause,
    }
}

fn required_fields(operation: &Operation) -> Vec<String> {
    operation
        .input_schema()
        .ok()
        .and_then(|schema| schema.get("required").and_then(|v| v.as_array()).cloned())
        .map(|required| {
            required
                .iter()
                .filter_map(|v| v.as_str())
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
