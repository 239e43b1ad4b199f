//! Core traits for graph database access.
//!
//! [`CypherExecutor`] is the binding boundary: one long-lived handle
//! capable of running a parameterized query and returning structured
//! rows plus an execution summary. [`Connect`] constructs that handle;
//! it is a separate seam so tests can count constructions and inject
//! scripted executors.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::error::AppError;
use crate::graph::row::{Params, Row};

/// Caller-declared query intent, used to select routing semantics and
/// to enforce read-only mode. The query text itself is never parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    Read,
    Write,
}

impl Routing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Update counters from a write query, when the backend reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateCounters {
    pub nodes_created: u64,
    pub nodes_deleted: u64,
    pub relationships_created: u64,
    pub relationships_deleted: u64,
    pub properties_set: u64,
    pub labels_added: u64,
    pub labels_removed: u64,
}

/// Execution summary attached to every query outcome.
///
/// Wall-clock timing is deliberately absent: the serialized response
/// must be identical for identical queries against unchanged data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuerySummary {
    pub rows_returned: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<UpdateCounters>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<String>,
}

/// Result of a single query execution.
#[derive(Debug, Clone, Default)]
pub struct QueryOutcome {
    pub rows: Vec<Row>,
    pub summary: QuerySummary,
}

/// Executes Cypher queries against a graph database.
///
/// The one shared binding is read-shared across concurrent tool
/// invocations; concurrency safety of query dispatch is delegated to
/// the implementation's internal connection handling.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Runs a parameterized query with the declared routing intent.
    async fn execute(
        &self,
        cypher: &str,
        params: Params,
        routing: Routing,
    ) -> Result<QueryOutcome, AppError>;
}

/// Constructs the query executor binding.
///
/// Implementations resolve their connection configuration at call time,
/// not at process startup, so a failed attempt can succeed later once
/// the configuration source is corrected.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn CypherExecutor>, AppError>;
}
