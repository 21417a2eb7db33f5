//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::ports::{GroupRepository, PostRepository, UserRepository};
use yatube_infra::{DatabaseConfig, DatabaseConnections, InMemoryStore};

#[cfg(feature = "postgres")]
use yatube_infra::database::{
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state, falling back to the in-memory store
    /// when no database is configured or reachable.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        tracing::info!("Application state initialized (postgres)");
                        return Self {
                            users: Arc::new(PostgresUserRepository::new(conn.main.clone())),
                            groups: Arc::new(PostgresGroupRepository::new(conn.main.clone())),
                            posts: Arc::new(PostgresPostRepository::new(conn.main.clone())),
                            db: Some(conn),
                        };
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory store");
        }

        let state = Self::in_memory(Arc::new(InMemoryStore::new()));
        tracing::info!("Application state initialized (in-memory)");
        state
    }

    /// State backed entirely by one in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store,
            db: None,
        }
    }
}
