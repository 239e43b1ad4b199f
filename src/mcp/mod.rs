//! MCP protocol layer: tool definitions and the exposure policy.

mod registry;
mod server;

pub mod tools;

pub use registry::ToolRegistry;
pub use server::McpServer;
