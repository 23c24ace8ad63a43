use std::env;
use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn};

#[cfg(feature = "postgres")]
use quill_core::PersistenceError;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the post database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Config for a URL with default pool settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Build a PostgreSQL config from discrete connection parameters.
    pub fn from_parts(host: &str, port: u16, database: &str, username: &str, password: &str) -> Self {
        Self::new(format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(username),
            urlencoding::encode(password),
            host,
            port,
            database
        ))
    }

    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` wins; otherwise `DB_HOST` (plus `DB_PORT`, `DB_NAME`,
    /// `DB_USER`, `DB_PASSWORD`) is used. Returns `None` when neither is set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let base = match lookup("DATABASE_URL") {
            Some(url) => Self::new(url),
            None => {
                let host = lookup("DB_HOST")?;
                Self::from_parts(
                    &host,
                    lookup("DB_PORT")
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(5432),
                    &lookup("DB_NAME").unwrap_or_else(|| "postgres".to_string()),
                    &lookup("DB_USER").unwrap_or_else(|| "postgres".to_string()),
                    &lookup("DB_PASSWORD").unwrap_or_default(),
                )
            }
        };

        Some(Self {
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.max_connections),
            min_connections: lookup("DB_MIN_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.min_connections),
            connect_timeout: lookup("DB_CONNECT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(base.connect_timeout),
            ..base
        })
    }

    /// The URL with its password masked, for logging.
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let credentials = &self.url[scheme_end + 3..at];
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{}{}:***{}", &self.url[..scheme_end + 3], user, &self.url[at..])
            }
            _ => self.url.clone(),
        }
    }
}

/// Open a pooled connection to the post database.
#[cfg(feature = "postgres")]
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, PersistenceError> {
    tracing::info!(url = %config.redacted_url(), "Connecting to post database");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false)
        .to_owned();

    let conn = Database::connect(opts)
        .await
        .map_err(|e| PersistenceError::ConnectionFailure(e.to_string()))?;

    tracing::info!(pool = config.max_connections, "Post database connected");
    Ok(conn)
}
