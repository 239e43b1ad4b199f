//! Neo4j backend implementation over the `neo4rs` Bolt driver.
//!
//! [`Neo4jConnector`] resolves the connection configuration from the
//! layered configuration source at each connect attempt - credentials
//! are read when the binding is first needed, not at process startup.
//! [`Neo4jExecutor`] wraps the driver's pooled `Graph` handle; the
//! target database is fixed at construction via the driver config.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use neo4rs::{
    BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType,
    ConfigBuilder, Graph,
};
use serde_json::Value as JsonValue;

use crate::config::Settings;
use crate::error::AppError;
use crate::graph::row::{Params, Row};
use crate::graph::traits::{Connect, CypherExecutor, QueryOutcome, QuerySummary, Routing};

/// Connects to Neo4j using lazily-resolved configuration.
pub struct Neo4jConnector;

#[async_trait]
impl Connect for Neo4jConnector {
    async fn connect(&self) -> Result<Arc<dyn CypherExecutor>, AppError> {
        let settings = Settings::load()?;
        let conn = settings.connection()?;

        tracing::info!(
            uri = %conn.uri,
            username = %conn.username,
            database = %conn.database,
            "Connecting to Neo4j"
        );

        let config = ConfigBuilder::default()
            .uri(&conn.uri)
            .user(&conn.username)
            .password(&conn.password)
            .db(conn.database.as_str())
            .build()
            .map_err(|e| crate::config::ConfigError::Driver(e.to_string()))?;

        let graph = Graph::connect(config)
            .await
            .map_err(|e| AppError::Unavailable(e.to_string()))?;

        tracing::info!("Connected to Neo4j");
        Ok(Arc::new(Neo4jExecutor { graph }))
    }
}

/// The query executor binding backed by a pooled Bolt connection.
pub struct Neo4jExecutor {
    graph: Graph,
}

#[async_trait]
impl CypherExecutor for Neo4jExecutor {
    async fn execute(
        &self,
        cypher: &str,
        params: Params,
        routing: Routing,
    ) -> Result<QueryOutcome, AppError> {
        // Auto-commit queries carry no cluster routing hint in neo4rs;
        // read/write separation is enforced at the gateway and the
        // declared intent is recorded for tracing.
        tracing::debug!(routing = routing.as_str(), "Executing Cypher query");

        let mut query = neo4rs::query(cypher);
        for (key, value) in &params {
            query = query.param(key, json_to_bolt(value));
        }

        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            let data: HashMap<String, JsonValue> = row.to().map_err(|e| AppError::Query {
                message: format!("failed to decode result row: {e}"),
            })?;
            rows.push(Row::new(data));
        }

        let summary = QuerySummary {
            rows_returned: rows.len(),
            ..QuerySummary::default()
        };
        Ok(QueryOutcome { rows, summary })
    }
}

/// Converts a JSON parameter value into the driver's Bolt representation.
fn json_to_bolt(value: &JsonValue) -> BoltType {
    match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => BoltType::Integer(BoltInteger::new(i)),
            None => BoltType::Float(BoltFloat::new(n.as_f64().unwrap_or(0.0))),
        },
        JsonValue::String(s) => BoltType::String(BoltString::new(s)),
        JsonValue::Array(items) => BoltType::List(BoltList {
            value: items.iter().map(json_to_bolt).collect(),
        }),
        JsonValue::Object(map) => BoltType::Map(BoltMap {
            value: map
                .iter()
                .map(|(k, v)| (BoltString::new(k), json_to_bolt(v)))
                .collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_map_to_matching_bolt_types() {
        assert!(matches!(json_to_bolt(&json!(null)), BoltType::Null(_)));
        assert!(matches!(json_to_bolt(&json!(true)), BoltType::Boolean(_)));
        assert!(matches!(json_to_bolt(&json!(7)), BoltType::Integer(_)));
        assert!(matches!(json_to_bolt(&json!(1.5)), BoltType::Float(_)));
        assert!(matches!(json_to_bolt(&json!("x")), BoltType::String(_)));
    }

    #[test]
    fn collections_convert_recursively() {
        let value = json!({"ids": [1, 2, 3], "nested": {"flag": false}});
        let BoltType::Map(map) = json_to_bolt(&value) else {
            panic!("expected map");
        };
        assert!(matches!(
            map.value.get(&BoltString::new("ids")),
            Some(BoltType::List(_))
        ));
        assert!(matches!(
            map.value.get(&BoltString::new("nested")),
            Some(BoltType::Map(_))
        ));
    }

    #[test]
    fn integer_overflow_falls_back_to_float() {
        let big = json!(u64::MAX);
        assert!(matches!(json_to_bolt(&big), BoltType::Float(_)));
    }
}
