//! Connection lifecycle management.
//!
//! Owns the single query executor binding for the process. Construction
//! is deferred until the first tool invocation needs the database, which
//! guarantees it happens inside a live runtime context, and is guarded
//! by single-flight semantics: concurrent first callers wait for one
//! construction attempt and all observe the same fully-initialized
//! binding. A failed attempt is not cached - the next caller retries
//! from scratch.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::error::AppError;
use crate::graph::traits::{Connect, CypherExecutor};

/// Manages the one long-lived binding per process.
pub struct ConnectionManager {
    connector: Box<dyn Connect>,
    binding: OnceCell<Arc<dyn CypherExecutor>>,
}

impl ConnectionManager {
    pub fn new(connector: impl Connect + 'static) -> Self {
        Self {
            connector: Box::new(connector),
            binding: OnceCell::new(),
        }
    }

    /// Returns the binding, constructing it on first use.
    ///
    /// Safe under concurrent first invocation: `OnceCell` serializes
    /// initialization, so exactly one `connect` runs even when many
    /// calls race, and errors leave the cell empty for retry.
    pub async fn acquire(&self) -> Result<Arc<dyn CypherExecutor>, AppError> {
        let binding = self
            .binding
            .get_or_try_init(|| async {
                tracing::info!("Acquiring database binding");
                self.connector.connect().await
            })
            .await?;
        Ok(Arc::clone(binding))
    }

    /// Whether the binding has been constructed yet.
    pub fn is_bound(&self) -> bool {
        self.binding.initialized()
    }
}
