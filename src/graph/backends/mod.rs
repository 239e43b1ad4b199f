//! Graph database backend implementations.

pub mod neo4j;
