//! MCP server command handler.

use color_eyre::Result;
use rmcp::ServiceExt;

use crate::config::Settings;
use crate::context::Context;
use crate::graph::backends::neo4j::Neo4jConnector;
use crate::mcp::ToolRegistry;

use super::App;

impl App {
    /// Run the MCP server with stdio transport.
    pub async fn run_mcp(&self) -> Result<()> {
        tracing::info!("Starting Neo4j Cypher MCP server");

        let settings = Settings::load()?;
        log_settings(&settings);

        let registry = ToolRegistry::new(Context::new(settings, Neo4jConnector));

        let service = registry.serve(rmcp::transport::stdio()).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to start MCP server");
            color_eyre::eyre::eyre!("Failed to start MCP server: {}", e)
        })?;

        tracing::info!("MCP server started, waiting for connections");

        service.waiting().await.map_err(|e| {
            tracing::error!(error = %e, "MCP server error");
            color_eyre::eyre::eyre!("MCP server error: {}", e)
        })?;

        tracing::info!("MCP server shutting down");
        Ok(())
    }
}

/// Log the non-secret settings at startup. The credential is never
/// logged; connection failures from a bad password surface at first
/// tool use instead.
pub(super) fn log_settings(settings: &Settings) {
    tracing::info!(
        uri = settings.uri.as_deref().unwrap_or("<unset>"),
        database = %settings.database,
        read_only = settings.read_only,
        namespace = %settings.namespace,
        read_timeout = settings.read_timeout,
        schema_sample_size = settings.schema_sample_size,
        response_token_limit = ?settings.response_budget(),
        "Resolved settings"
    );
}
