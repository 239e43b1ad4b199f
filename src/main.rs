//! Neo4j Cypher MCP Server

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cypher_mcp::cli::App;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let app = App::parse();

    // Logs go to stderr: stdout belongs to the stdio MCP transport.
    let default_filter = if app.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    app.run().await
}
