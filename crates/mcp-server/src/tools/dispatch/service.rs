use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler};
use serde_json::json;
use servicenow_protocol::{LIST_TOOL_PACKAGES, TOOL_PACKAGE_ENV};

use super::{Dispatcher, ToolListing};
use crate::tools::error::DispatchError;

/// MCP front of the [`Dispatcher`].
#[derive(Clone)]
pub struct ServiceNowService {
    dispatcher: Arc<Dispatcher>,
}

impl ServiceNowService {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    fn instructions(&self) -> String {
        let package = self.dispatcher.state().package();
        format!(
            "ServiceNow tools (incidents, customer service cases, change requests, users, service catalog). \
Active tool package: '{}'. Call `{LIST_TOOL_PACKAGES}` to see the available packages; \
the package is chosen at startup through {TOOL_PACKAGE_ENV}.",
            package.name()
        )
    }
}

fn to_tool(listing: ToolListing) -> Tool {
    Tool::new(listing.name, listing.description, Arc::new(listing.input_schema))
}

fn error_result(err: &DispatchError) -> CallToolResult {
    let mut result = CallToolResult::error(vec![Content::text(err.to_string())]);
    result.structured_content = Some(json!({ "error": err.envelope() }));
    result
}

impl ServerHandler for ServiceNowService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(self.instructions()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            let tools = self.dispatcher.enumerate().into_iter().map(to_tool).collect();
            Ok(ListToolsResult::with_all_items(tools))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match self
                .dispatcher
                .invoke(&request.name, request.arguments)
                .await
            {
                Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
                Err(err) => Ok(error_result(&err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dispatch_errors_become_error_results_with_envelope() {
        let err = DispatchError::OperationNotFound {
            name: "nope".to_string(),
        };
        let result = error_result(&err);
        assert_eq!(result.is_error, Some(true));
        let text = result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone());
        assert_eq!(text.as_deref(), Some("Unknown tool: nope"));
        let envelope = result.structured_content.unwrap();
        assert_eq!(envelope["error"]["code"], "operation_not_found");
        assert_eq!(envelope["error"]["details"]["tool"], "nope");
    }
}
