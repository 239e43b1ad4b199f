//! Shared application context wiring settings to the service layer.

use std::sync::Arc;

use crate::config::Settings;
use crate::gateway::QueryGateway;
use crate::graph::{Connect, ConnectionManager};
use crate::schema::SchemaInspector;

/// Application context holding the resolved settings and the services
/// built over the one shared connection manager.
#[derive(Clone)]
pub struct Context {
    pub settings: Arc<Settings>,
    pub gateway: Arc<QueryGateway>,
    pub inspector: Arc<SchemaInspector>,
}

impl Context {
    pub fn new(settings: Settings, connector: impl Connect + 'static) -> Self {
        let manager = Arc::new(ConnectionManager::new(connector));
        let gateway = Arc::new(QueryGateway::new(Arc::clone(&manager), &settings));
        let inspector = Arc::new(SchemaInspector::new(manager, &settings));
        Self {
            settings: Arc::new(settings),
            gateway,
            inspector,
        }
    }
}
