//! Application state - shared across all handlers.

use std::sync::Arc;

use publica_core::ports::{PostRepository, UserRepository};
use publica_core::service::{FeedQuery, PostService, SearchService};
use publica_infra::database::{DatabaseConfig, MemoryPostRepository, MemoryUserRepository};

#[cfg(feature = "postgres")]
use publica_infra::database::{DatabaseConnections, PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub post_service: Arc<PostService>,
    pub feed: Arc<FeedQuery>,
    pub search: Arc<SearchService>,
    /// Which store the repositories ended up on; reported by the health
    /// endpoint so an operator can tell a fallback apart from a real database.
    pub storage: &'static str,
}

type Repos = (Arc<dyn UserRepository>, Arc<dyn PostRepository>);

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let ((users, posts), storage): (Repos, &'static str) = {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => (
                        (
                            Arc::new(PostgresUserRepository::new(connections.main.clone())),
                            Arc::new(PostgresPostRepository::new(connections.main)),
                        ),
                        "postgres",
                    ),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory repositories.",
                            e
                        );
                        (Self::memory_repos(), "memory")
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running with in-memory repositories.");
                (Self::memory_repos(), "memory")
            }
        };

        #[cfg(not(feature = "postgres"))]
        let ((users, posts), storage): (Repos, &'static str) = {
            let _ = db_config;
            tracing::info!("Built without the postgres feature - using in-memory repositories");
            (Self::memory_repos(), "memory")
        };

        tracing::info!(storage, "Application state initialized");

        Self {
            post_service: Arc::new(PostService::new(posts.clone(), users.clone())),
            feed: Arc::new(FeedQuery::new(posts.clone(), users.clone())),
            search: Arc::new(SearchService::new(posts, users.clone())),
            users,
            storage,
        }
    }

    fn memory_repos() -> Repos {
        (
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryPostRepository::new()),
        )
    }
}
