//! ServiceNow MCP Server
//!
//! Exposes ServiceNow ITSM operations (incidents, customer service cases, change
//! requests, users, service catalog) to AI agents as MCP tools. Which tools are
//! visible is decided once at startup by the selected tool package.
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "servicenow": {
//!       "command": "servicenow-mcp",
//!       "env": {
//!         "SERVICENOW_INSTANCE_URL": "https://example.service-now.com",
//!         "SERVICENOW_USERNAME": "admin",
//!         "SERVICENOW_PASSWORD": "...",
//!         "MCP_TOOL_PACKAGE": "full"
//!       }
//!     }
//!   }
//! }
//! ```

pub mod config;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use config::Cli;
pub use tools::{
    build_registry, normalize, DispatchError, Dispatcher, Operation, OperationContext,
    OutputShape, RawOutput, Registry, RegistryError, ServiceNowService, SessionState,
    ToolListing,
};
