//! CLI module.
//!
//! Subcommands:
//! - `mcp`: Run the MCP server (stdio transport)
//! - `serve`: Run the MCP server (HTTP transport)

mod mcp;
mod serve;

use clap::{Parser, Subcommand};

/// Neo4j Cypher MCP server
#[derive(Parser)]
#[command(name = "cypher-mcp")]
#[command(about = "MCP server exposing Cypher access to a Neo4j database")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the MCP server (stdio transport for local use)
    Mcp,

    /// Run the MCP server (HTTP transport for remote access)
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Mcp => self.run_mcp().await,
            Command::Serve { ref host, port } => self.run_serve(host, port).await,
        }
    }
}
