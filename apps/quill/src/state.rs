//! Store selection - PostgreSQL when configured, in-memory otherwise.

use std::sync::Arc;

use quill_core::ports::PostRepository;
use quill_infra::InMemoryPostRepository;
use quill_infra::database::DatabaseConfig;

#[cfg(feature = "postgres")]
use quill_infra::PostgresPostRepository;

/// The post store plus, when backed by PostgreSQL, the concrete repository.
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    #[cfg(feature = "postgres")]
    pub postgres: Option<Arc<PostgresPostRepository>>,
}

impl AppState {
    /// Build the store for the given configuration.
    ///
    /// A configured database that cannot be reached is an error; no database
    /// configuration at all falls back to the in-memory store.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> anyhow::Result<Self> {
        #[cfg(feature = "postgres")]
        if let Some(config) = db_config {
            let conn = quill_infra::database::connect(config).await?;
            let repo = Arc::new(PostgresPostRepository::new(conn));
            return Ok(Self {
                posts: repo.clone(),
                postgres: Some(repo),
            });
        }

        if db_config.is_some() {
            tracing::warn!("Built without postgres feature - ignoring database configuration");
        } else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        }

        Ok(Self {
            posts: Arc::new(InMemoryPostRepository::new()),
            #[cfg(feature = "postgres")]
            postgres: None,
        })
    }
}
