//! Graph abstraction layer for backend-agnostic database access.
//!
//! The binding boundary is the [`CypherExecutor`] trait: one long-lived
//! handle that runs parameterized queries and returns JSON-valued rows.
//! [`ConnectionManager`] owns that handle, constructing it lazily with
//! single-flight protection. The production backend lives in
//! [`backends::neo4j`]; tests substitute scripted executors through the
//! same traits.

mod connection;
mod row;
mod traits;

pub mod backends;

pub use connection::ConnectionManager;
pub use row::{Params, Row};
pub use traits::{Connect, CypherExecutor, QueryOutcome, QuerySummary, Routing, UpdateCounters};
