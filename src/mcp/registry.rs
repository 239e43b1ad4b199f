//! Tool registry: the externally-visible tool surface.
//!
//! Wraps the inner [`McpServer`] to apply two policies the tool macros
//! cannot express: the configured namespace prefix on every exposed
//! tool name, and withholding the write tool in read-only mode. A
//! withheld or unprefixed name is indistinguishable from an unknown
//! tool to the client.

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, ErrorCode, ListToolsResult, PaginatedRequestParam,
        ServerInfo,
    },
    service::{RequestContext, RoleServer},
    ErrorData as McpError,
};

use crate::context::Context;
use crate::mcp::server::McpServer;
use crate::mcp::tools::{READ_TOOL, SCHEMA_TOOL, WRITE_TOOL};

#[derive(Clone)]
pub struct ToolRegistry {
    inner: McpServer,
    namespace: String,
    read_only: bool,
}

impl ToolRegistry {
    pub fn new(ctx: Context) -> Self {
        let settings = &ctx.settings;
        let namespace = settings.namespace.clone();
        let read_only = settings.read_only;
        tracing::info!(namespace = %namespace, read_only, "Initializing tool registry");

        Self {
            inner: McpServer::new(ctx),
            namespace,
            read_only,
        }
    }
}

/// Base names exposed under the given policy.
fn exposed_tools(read_only: bool) -> &'static [&'static str] {
    if read_only {
        &[SCHEMA_TOOL, READ_TOOL]
    } else {
        &[SCHEMA_TOOL, READ_TOOL, WRITE_TOOL]
    }
}

/// Externally visible name for a base tool name.
fn external_name(namespace: &str, base: &str) -> String {
    if namespace.is_empty() {
        base.to_string()
    } else {
        format!("{namespace}_{base}")
    }
}

/// Maps an externally visible name back to its base name, or `None`
/// for names not exposed under the policy.
fn resolve_tool(namespace: &str, read_only: bool, name: &str) -> Option<&'static str> {
    exposed_tools(read_only)
        .iter()
        .copied()
        .find(|base| external_name(namespace, base) == name)
}

impl ServerHandler for ToolRegistry {
    fn get_info(&self) -> ServerInfo {
        self.inner.get_info()
    }

    async fn list_tools(
        &self,
        request: Option<PaginatedRequestParam>,
        context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let mut result = self.inner.list_tools(request, context).await?;
        result
            .tools
            .retain(|tool| resolve_tool("", self.read_only, tool.name.as_ref()).is_some());
        for tool in &mut result.tools {
            tool.name = external_name(&self.namespace, tool.name.as_ref()).into();
        }
        Ok(result)
    }

    async fn call_tool(
        &self,
        mut request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let Some(base) = resolve_tool(&self.namespace, self.read_only, request.name.as_ref())
        else {
            return Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("tool not found: {}", request.name),
                None,
            ));
        };
        request.name = base.into();
        self.inner.call_tool(request, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_namespace_leaves_names_untouched() {
        assert_eq!(external_name("", SCHEMA_TOOL), "get_neo4j_schema");
    }

    #[test]
    fn namespace_prefixes_every_name() {
        assert_eq!(external_name("g", READ_TOOL), "g_read_neo4j_cypher");
        assert_eq!(external_name("flights", WRITE_TOOL), "flights_write_neo4j_cypher");
    }

    #[test]
    fn prefixed_names_resolve_to_base_names() {
        assert_eq!(
            resolve_tool("g", false, "g_read_neo4j_cypher"),
            Some(READ_TOOL)
        );
        assert_eq!(
            resolve_tool("g", false, "g_get_neo4j_schema"),
            Some(SCHEMA_TOOL)
        );
    }

    #[test]
    fn unprefixed_names_are_not_exposed_under_a_namespace() {
        assert_eq!(resolve_tool("g", false, "read_neo4j_cypher"), None);
    }

    #[test]
    fn write_tool_is_withheld_in_read_only_mode() {
        assert!(!exposed_tools(true).contains(&WRITE_TOOL));
        assert_eq!(resolve_tool("", true, "write_neo4j_cypher"), None);
        assert_eq!(resolve_tool("", true, "read_neo4j_cypher"), Some(READ_TOOL));
    }

    #[test]
    fn all_three_tools_exposed_by_default() {
        assert_eq!(exposed_tools(false).len(), 3);
    }
}
