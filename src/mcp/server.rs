//! Inner MCP server carrying the tool implementations.
//!
//! This server exposes the tools under their base names; the
//! [`ToolRegistry`](crate::mcp::ToolRegistry) wraps it to apply the
//! configured namespace prefix and the read-only exposure policy.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, ServerHandler},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool_handler,
};

use crate::context::Context;

/// MCP server exposing Cypher access to a Neo4j database.
#[derive(Clone)]
pub struct McpServer {
    pub(crate) ctx: Arc<Context>,
    tool_router: ToolRouter<McpServer>,
}

impl McpServer {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx: Arc::new(ctx),
            tool_router: Self::tool_router(),
        }
    }

    /// Build the combined tool router from all tool modules.
    fn tool_router() -> ToolRouter<Self> {
        Self::schema_tools() + Self::cypher_tools()
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                r#"Neo4j Cypher MCP Server

Run Cypher queries against a Neo4j database.

## Tools

- **get_neo4j_schema** - List labels and relationship types with
  property names and types inferred from sampled data. Call this first
  to learn the graph's shape.
- **read_neo4j_cypher** - Execute a read query and get rows as JSON.
- **write_neo4j_cypher** - Execute a write query (absent when the
  server runs read-only).

## Usage

Pass query values as `$name` parameters rather than interpolating them
into the query text. Large results are truncated to a configured
budget; a truncated response carries `"truncated": true` and
`"rows_omitted"` so you can narrow the query and retry.
"#
                .to_string(),
            ),
        }
    }
}
