//! HTTP server command handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use color_eyre::Result;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use tower::ServiceBuilder;

use crate::config::Settings;
use crate::context::Context;
use crate::graph::backends::neo4j::Neo4jConnector;
use crate::mcp::ToolRegistry;

use super::App;

impl App {
    /// Run the MCP server with streamable-HTTP transport.
    pub async fn run_serve(&self, host: &str, port: u16) -> Result<()> {
        tracing::info!("Starting Neo4j Cypher HTTP server");

        let settings = Settings::load()?;
        super::mcp::log_settings(&settings);

        let registry = ToolRegistry::new(Context::new(settings, Neo4jConnector));

        let service = StreamableHttpService::new(
            move || Ok(registry.clone()),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig::default(),
        );

        let app = Router::new().fallback_service(ServiceBuilder::new().service(service));

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid address {}:{}: {}", host, port, e))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to bind to {}: {}", addr, e))?;

        tracing::info!("HTTP server listening on http://{}", addr);

        axum::serve(listener, app).await.map_err(|e| {
            tracing::error!(error = %e, "HTTP server error");
            color_eyre::eyre::eyre!("HTTP server error: {}", e)
        })?;

        tracing::info!("HTTP server shutting down");
        Ok(())
    }
}
