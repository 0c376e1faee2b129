use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use servicenow_backend::{BackendConfig, TableApi};
use servicenow_protocol::LIST_TOOL_PACKAGES;
use thiserror::Error;

use super::error::DispatchError;
use super::output::RawOutput;

pub type JsonObject = Map<String, Value>;

pub type OperationFuture = Pin<Box<dyn Future<Output = anyhow::Result<RawOutput>> + Send>>;

type Invoker =
    dyn Fn(OperationContext, Value) -> serde_json::Result<OperationFuture> + Send + Sync;

type SchemaFn = fn() -> anyhow::Result<JsonObject>;

/// Collaborators every tool implementation receives.
#[derive(Clone)]
pub struct OperationContext {
    pub config: Arc<BackendConfig>,
    pub api: Arc<dyn TableApi>,
}

impl OperationContext {
    pub fn new(config: Arc<BackendConfig>, api: Arc<dyn TableApi>) -> Self {
        Self { config, api }
    }
}

/// What a tool's raw result looks like. Descriptive only: normalization picks its
/// converter from the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// Confirmation text, or a JSON document already rendered as text.
    Text,
    /// A JSON mapping or list.
    Json,
    /// A typed response record.
    Record,
}

impl OutputShape {
    pub fn accepts(self, raw: &RawOutput) -> bool {
        matches!(
            (self, raw),
            (Self::Text, RawOutput::Text(_))
                | (Self::Json, RawOutput::Json(_))
                | (Self::Record, RawOutput::Record(_))
        )
    }
}

pub struct Operation {
    name: &'static str,
    description: &'static str,
    output: OutputShape,
    schema: SchemaFn,
    invoker: Box<Invoker>,
}

impl Operation {
    /// Binds `handler` to the input contract `P`.
    pub fn new<P, F, Fut>(
        name: &'static str,
        description: &'static str,
        output: OutputShape,
        handler: F,
    ) -> Self
    where
        P: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(OperationContext, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<RawOutput>> + Send + 'static,
    {
        let invoker = move |context: OperationContext,
                            args: Value|
              -> serde_json::Result<OperationFuture> {
            let params: P = serde_json::from_value(args)?;
            let fut: OperationFuture = Box::pin(handler(context, params));
            Ok(fut)
        };
        Self {
            name,
            description,
            output,
            schema: input_schema_for::<P>,
            invoker: Box::new(invoker),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_schema(mut self, schema: SchemaFn) -> Self {
        self.schema = schema;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn output_shape(&self) -> OutputShape {
        self.output
    }

    pub fn input_schema(&self) -> anyhow::Result<JsonObject> {
        (self.schema)()
    }

    /// Validates `args` against the input contract and, on success, returns the
    /// not-yet-polled execution.
    pub fn prepare(
        &self,
        context: OperationContext,
        args: JsonObject,
    ) -> serde_json::Result<OperationFuture> {
        (self.invoker)(context, Value::Object(args))
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

pub(crate) fn input_schema_for<P: JsonSchema>() -> anyhow::Result<JsonObject> {
    let schema = schemars::schema_for!(P);
    match serde_json::to_value(schema)? {
        Value::Object(object) => Ok(object),
        other => anyhow::bail!("input schema is not an object: {other}"),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool name '{0}' is reserved for package introspection")]
    ReservedName(String),

    #[error("tool '{0}' is registered more than once")]
    Duplicate(String),
}

/// Name -> operation, in registration order. Immutable once built.
#[derive(Debug, Default)]
pub struct Registry {
    operations: Vec<Operation>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn new(operations: Vec<Operation>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(operations.len());
        for (position, operation) in operations.iter().enumerate() {
            if operation.name == LIST_TOOL_PACKAGES {
                return Err(RegistryError::ReservedName(operation.name.to_string()));
            }
            if index.insert(operation.name, position).is_some() {
                return Err(RegistryError::Duplicate(operation.name.to_string()));
            }
        }
        Ok(Self { operations, index })
    }

    pub fn lookup(&self, name: &str) -> Result<&Operation, DispatchError> {
        self.index
            .get(name)
            .map(|&position| &self.operations[position])
            .ok_or_else(|| DispatchError::OperationNotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct EchoParams {
        message: String,
        #[serde(default)]
        repeat: Option<u32>,
    }

    async fn echo(_context: OperationContext, params: EchoParams) -> anyhow::Result<RawOutput> {
        let times = params.repeat.unwrap_or(1) as usize;
        Ok(RawOutput::text(params.message.repeat(times)))
    }

    fn echo_op(name: &'static str) -> Operation {
        Operation::new(name, "Echo a message", OutputShape::Text, echo)
    }

    #[test]
    fn schema_lists_required_fields() {
        let schema = echo_op("echo").input_schema().unwrap();
        assert_eq!(schema.get("type").and_then(Value::as_str), Some("object"));
        let required = schema.get("required").and_then(Value::as_array).unwrap();
        assert_eq!(required, &vec![Value::String("message".to_string())]);
        assert!(schema["properties"].get("repeat").is_some());
    }

    #[test]
    fn lookup_reports_unknown_names() {
        let registry = Registry::new(vec![echo_op("echo")]).unwrap();
        assert_eq!(registry.lookup("echo").unwrap().name(), "echo");
        assert!(matches!(
            registry.lookup("nope"),
            Err(DispatchError::OperationNotFound { name }) if name == "nope"
        ));
    }

    #[test]
    fn reserved_and_duplicate_names_are_rejected() {
        assert_eq!(
            Registry::new(vec![echo_op(LIST_TOOL_PACKAGES)]).unwrap_err(),
            RegistryError::ReservedName(LIST_TOOL_PACKAGES.to_string())
        );
        assert_eq!(
            Registry::new(vec![echo_op("echo"), echo_op("echo")]).unwrap_err(),
            RegistryError::Duplicate("echo".to_string())
        );
    }

    #[test]
    fn output_shape_matches_variants() {
        assert!(OutputShape::Text.accepts(&RawOutput::text("ok")));
        assert!(!OutputShape::Json.accepts(&RawOutput::text("ok")));
        assert!(OutputShape::Record.accepts(&RawOutput::record(serde_json::json!({}))));
    }
}
