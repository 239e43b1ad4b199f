//! Cypher execution tools.
//!
//! The read and write tools share one gateway; they differ only in the
//! routing intent they declare. The gateway enforces the server-wide
//! read-only gate, so the write tool fails cleanly even if a client
//! calls it despite it being withheld from the exposed set.

use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars::{self, JsonSchema},
    tool, tool_router, ErrorData as McpError,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::graph::{Params as QueryParams, Routing};
use crate::mcp::server::McpServer;

/// Parameters for the Cypher execution tools.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CypherParams {
    /// The Cypher query to execute.
    pub query: String,
    /// Query parameters, referenced as `$name` in the query text.
    #[serde(default)]
    pub params: Option<serde_json::Map<String, JsonValue>>,
}

#[tool_router(router = cypher_tools, vis = "pub(crate)")]
impl McpServer {
    #[tool(
        name = "read_neo4j_cypher",
        description = "Execute a read Cypher query (MATCH, RETURN, CALL on read procedures) and return the result rows as JSON. Use $name parameters instead of interpolating values."
    )]
    pub async fn read_cypher(
        &self,
        Parameters(params): Parameters<CypherParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_cypher(params, Routing::Read).await
    }

    #[tool(
        name = "write_neo4j_cypher",
        description = "Execute a write Cypher query (CREATE, MERGE, SET, DELETE) and return the result rows as JSON. Unavailable when the server runs in read-only mode."
    )]
    pub async fn write_cypher(
        &self,
        Parameters(params): Parameters<CypherParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_cypher(params, Routing::Write).await
    }
}

impl McpServer {
    async fn run_cypher(
        &self,
        params: CypherParams,
        routing: Routing,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(routing = routing.as_str(), "Running Cypher tool");

        let query_params = to_query_params(params.params);
        match self
            .ctx
            .gateway
            .run(&params.query, query_params, routing)
            .await
        {
            Ok(shaped) => Ok(CallToolResult::success(vec![Content::text(shaped.text)])),
            Err(err) => Ok(err.into_tool_result()),
        }
    }
}

fn to_query_params(params: Option<serde_json::Map<String, JsonValue>>) -> QueryParams {
    params.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_params_become_an_empty_map() {
        assert!(to_query_params(None).is_empty());
    }

    #[test]
    fn params_carry_over_by_name() {
        let mut map = serde_json::Map::new();
        map.insert("tail".to_string(), json!("N95040A"));
        map.insert("limit".to_string(), json!(10));

        let params = to_query_params(Some(map));
        assert_eq!(params.len(), 2);
        assert_eq!(params["tail"], json!("N95040A"));
        assert_eq!(params["limit"], json!(10));
    }
}
