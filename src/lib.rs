//! Neo4j Cypher MCP Server
//!
//! An MCP tool server exposing schema inspection and Cypher execution
//! over a Neo4j database.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod graph;
pub mod mcp;
pub mod schema;
pub mod shape;
