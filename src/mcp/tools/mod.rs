//! MCP tool implementations.

pub mod cypher;
pub mod schema;

/// Base tool names, before any namespace prefix is applied.
pub const SCHEMA_TOOL: &str = "get_neo4j_schema";
pub const READ_TOOL: &str = "read_neo4j_cypher";
pub const WRITE_TOOL: &str = "write_neo4j_cypher";
