use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};

use crate::diagnostic_log::DiagnosticLog;
use crate::errors::McpError;
use crate::sparql::SparqlClient;
use crate::tools::{self, query::Query};

const SERVER_NAME: &str = "Virtuoso SPARQL MCP Server";

/// The MCP handler for a live session
#[derive(Clone)]
pub struct Running<C> {
    query_tool: Query<C>,
}

impl<C: SparqlClient> Running<C> {
    pub fn new(client: C, diagnostic_log: DiagnosticLog) -> Self {
        Self {
            query_tool: Query::new(client, diagnostic_log),
        }
    }

    fn list_tools_impl(&self) -> ListToolsResult {
        ListToolsResult {
            next_cursor: None,
            tools: tools::list_tools(),
            ..Default::default()
        }
    }

    async fn call_tool_impl(&self, name: &str, arguments: Option<&JsonObject>) -> CallToolResult {
        self.query_tool.execute(name, arguments).await
    }
}

impl<C> ServerHandler for Running<C>
where
    C: SparqlClient + Clone + 'static,
{
    #[tracing::instrument(skip_all, fields(virtuoso.mcp.tool_name = request.name.as_ref(), virtuoso.mcp.request_id = %context.id.clone()))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .call_tool_impl(&request.name, request.arguments.as_ref())
            .await)
    }

    #[tracing::instrument(skip_all)]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(self.list_tools_impl())
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                icons: None,
                title: Some(SERVER_NAME.to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                ..Default::default()
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                ..Default::default()
            },
            instructions: Some(
                "Use the query_virtuoso tool to run SPARQL queries against a Virtuoso endpoint."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
