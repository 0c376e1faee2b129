//! ServiceNow MCP tool surface.
//!
//! Split the same way the dispatch path runs: the operation registry and its
//! catalog, output normalization, the dispatch core, and the per-domain tool
//! implementations with their request/response schemas.

mod case;
mod catalog;
mod change;
mod dispatch;
mod error;
mod incident;
mod introspection;
mod output;
mod registry;
mod schemas;
mod service_catalog;
mod table;
mod user;

pub use catalog::build_registry;
pub use dispatch::{Dispatcher, ServiceNowService, SessionState, ToolListing};
pub use error::DispatchError;
pub use output::{normalize, RawOutput, Record};
pub use registry::{Operation, OperationContext, OutputShape, Registry, RegistryError};
