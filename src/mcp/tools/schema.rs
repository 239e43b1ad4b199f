//! Schema inspection tool.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;

use crate::mcp::server::McpServer;

/// Parameters for the get_neo4j_schema tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetSchemaParams {
    /// Instances to sample per label and relationship type
    /// (default: server-configured, typically 1000).
    #[serde(default)]
    pub sample_size: Option<u32>,
}

#[tool_router(router = schema_tools, vis = "pub(crate)")]
impl McpServer {
    #[tool(
        name = "get_neo4j_schema",
        description = "List node labels and relationship types in the database, with property names and types inferred from sampled instances. Call this before writing Cypher queries."
    )]
    pub async fn get_schema(
        &self,
        Parameters(params): Parameters<GetSchemaParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(sample_size = ?params.sample_size, "Running get_neo4j_schema tool");

        match self.ctx.inspector.describe(params.sample_size).await {
            Ok(shaped) => Ok(CallToolResult::success(vec![Content::text(shaped.text)])),
            Err(err) => Ok(err.into_tool_result()),
        }
    }
}
