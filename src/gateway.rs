//! Query gateway: validated, bounded execution of client-supplied Cypher.
//!
//! Read and write entry points share this one implementation, differing
//! only in declared routing intent. The gateway trusts the caller's
//! declared intent - query text is opaque at this layer - and relies on
//! the database's own routing enforcement, plus the server-wide
//! read-only gate for writes.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Map;

use crate::config::Settings;
use crate::error::AppError;
use crate::graph::{ConnectionManager, Params, Routing, Row};
use crate::shape::{shape, Payload, Shaped};

pub struct QueryGateway {
    manager: Arc<ConnectionManager>,
    read_only: bool,
    timeout: Duration,
    budget: Option<usize>,
}

impl QueryGateway {
    pub fn new(manager: Arc<ConnectionManager>, settings: &Settings) -> Self {
        Self {
            manager,
            read_only: settings.read_only,
            timeout: Duration::from_secs(settings.read_timeout),
            budget: settings.response_budget(),
        }
    }

    /// Executes a query with the declared intent and returns the shaped
    /// bounded result.
    ///
    /// Fails before any database call for write intent in read-only
    /// mode (`PERMISSION_DENIED`) and for blank query text
    /// (`INVALID_ARGUMENT`). Execution is bounded by the configured
    /// timeout; timed-out queries are abandoned, not retried.
    pub async fn run(
        &self,
        cypher: &str,
        params: Params,
        routing: Routing,
    ) -> Result<Shaped, AppError> {
        if routing == Routing::Write && self.read_only {
            return Err(AppError::ReadOnly);
        }
        if cypher.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "query must not be empty".to_string(),
            ));
        }

        let executor = self.manager.acquire().await?;

        let outcome = tokio::time::timeout(self.timeout, executor.execute(cypher, params, routing))
            .await
            .map_err(|_| AppError::Timeout {
                seconds: self.timeout.as_secs(),
            })??;

        tracing::debug!(
            routing = routing.as_str(),
            rows = outcome.summary.rows_returned,
            "Query completed"
        );

        let mut meta = Map::new();
        meta.insert(
            "summary".to_string(),
            serde_json::to_value(&outcome.summary)?,
        );
        let payload = Payload {
            rows: outcome.rows.into_iter().map(Row::into_json).collect(),
            meta,
        };
        shape(&payload, self.budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::graph::{Connect, CypherExecutor, QueryOutcome, QuerySummary};

    /// Executor that replays canned rows, counting calls and optionally
    /// sleeping to simulate a slow database.
    struct StubExecutor {
        calls: Arc<AtomicUsize>,
        rows: Vec<serde_json::Value>,
        delay: Option<Duration>,
        fail_with: Option<fn() -> AppError>,
    }

    #[async_trait]
    impl CypherExecutor for StubExecutor {
        async fn execute(
            &self,
            _cypher: &str,
            _params: Params,
            _routing: Routing,
        ) -> Result<QueryOutcome, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(fail) = self.fail_with {
                return Err(fail());
            }
            let rows: Vec<Row> = self
                .rows
                .iter()
                .map(|v| {
                    let map: HashMap<String, serde_json::Value> =
                        serde_json::from_value(v.clone()).unwrap();
                    Row::new(map)
                })
                .collect();
            let summary = QuerySummary {
                rows_returned: rows.len(),
                ..QuerySummary::default()
            };
            Ok(QueryOutcome { rows, summary })
        }
    }

    struct StubConnector {
        executor: Arc<StubExecutor>,
    }

    #[async_trait]
    impl Connect for StubConnector {
        async fn connect(&self) -> Result<Arc<dyn CypherExecutor>, AppError> {
            Ok(Arc::clone(&self.executor) as Arc<dyn CypherExecutor>)
        }
    }

    fn gateway_with(
        executor: StubExecutor,
        configure: impl FnOnce(&mut Settings),
    ) -> (QueryGateway, Arc<AtomicUsize>) {
        let calls = Arc::clone(&executor.calls);
        let mut settings = Settings::default();
        configure(&mut settings);
        let manager = Arc::new(ConnectionManager::new(StubConnector {
            executor: Arc::new(executor),
        }));
        (QueryGateway::new(manager, &settings), calls)
    }

    fn rows_executor(rows: Vec<serde_json::Value>) -> StubExecutor {
        StubExecutor {
            calls: Arc::new(AtomicUsize::new(0)),
            rows,
            delay: None,
            fail_with: None,
        }
    }

    #[tokio::test]
    async fn read_query_returns_shaped_rows() {
        let (gateway, _) = gateway_with(
            rows_executor(vec![json!({"name": "n95040a", "model": "737-800"})]),
            |_| {},
        );

        let shaped = gateway
            .run("MATCH (a:Aircraft) RETURN a.name AS name", Params::new(), Routing::Read)
            .await
            .unwrap();

        assert!(!shaped.truncated);
        let body: serde_json::Value = serde_json::from_str(&shaped.text).unwrap();
        assert_eq!(body["rows"][0]["model"], "737-800");
        assert_eq!(body["summary"]["rows_returned"], 1);
    }

    #[tokio::test]
    async fn identical_reads_produce_identical_payloads() {
        let (gateway, _) = gateway_with(
            rows_executor(vec![json!({"b": 2, "a": 1}), json!({"c": 3})]),
            |s| s.response_token_limit = Some(10_000),
        );

        let first = gateway.run("RETURN 1", Params::new(), Routing::Read).await.unwrap();
        let second = gateway.run("RETURN 1", Params::new(), Routing::Read).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn write_in_read_only_mode_never_reaches_the_binding() {
        let (gateway, calls) = gateway_with(rows_executor(vec![]), |s| s.read_only = true);

        let err = gateway
            .run("CREATE (n:Test)", Params::new(), Routing::Write)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ReadOnly));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reads_still_work_in_read_only_mode() {
        let (gateway, _) = gateway_with(rows_executor(vec![json!({"n": 1})]), |s| {
            s.read_only = true;
        });

        let shaped = gateway
            .run("MATCH (n) RETURN n", Params::new(), Routing::Read)
            .await
            .unwrap();
        assert!(shaped.text.contains("\"n\":1"));
    }

    #[tokio::test]
    async fn blank_query_is_rejected_before_any_call() {
        let (gateway, calls) = gateway_with(rows_executor(vec![]), |_| {});

        let err = gateway.run("   ", Params::new(), Routing::Read).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_query_times_out_within_the_window() {
        let executor = StubExecutor {
            calls: Arc::new(AtomicUsize::new(0)),
            rows: vec![],
            delay: Some(Duration::from_secs(120)),
            fail_with: None,
        };
        let (gateway, _) = gateway_with(executor, |s| s.read_timeout = 30);

        let start = tokio::time::Instant::now();
        let err = gateway
            .run("MATCH (n) RETURN n", Params::new(), Routing::Read)
            .await
            .unwrap_err();
        let elapsed = start.elapsed();

        assert!(matches!(err, AppError::Timeout { seconds: 30 }));
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_secs(120));
    }

    #[tokio::test]
    async fn database_errors_pass_through_untouched() {
        let executor = StubExecutor {
            calls: Arc::new(AtomicUsize::new(0)),
            rows: vec![],
            delay: None,
            fail_with: Some(|| AppError::Query {
                message: "Invalid input 'MATCHX'".to_string(),
            }),
        };
        let (gateway, calls) = gateway_with(executor, |_| {});

        let err = gateway
            .run("MATCHX (n)", Params::new(), Routing::Read)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Query { .. }));
        // Exactly one attempt: database errors are not retried.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn oversized_results_are_truncated_to_budget() {
        let rows = (0..200)
            .map(|i| json!({"id": i, "payload": "x".repeat(32)}))
            .collect();
        let (gateway, _) = gateway_with(rows_executor(rows), |s| {
            s.response_token_limit = Some(200);
        });

        let shaped = gateway
            .run("MATCH (n) RETURN n", Params::new(), Routing::Read)
            .await
            .unwrap();
        assert!(shaped.truncated);
        assert!(crate::shape::estimate_tokens(&shaped.text) <= 200);
    }
}
