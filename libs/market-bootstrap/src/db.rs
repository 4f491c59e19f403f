use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};

/// `database` section of a service config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// sea-orm connection URL, e.g. `sqlite://catalog.db?mode=rwc`.
    pub url: String,
    pub max_connections: u32,
    /// Upper bound for a single store call.
    #[serde(with = "humantime_serde")]
    pub query_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_owned(),
            max_connections: 10,
            query_timeout: Duration::from_secs(5),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Open a connection pool.
    ///
    /// # Errors
    /// Returns the driver error if the database cannot be reached.
    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        let mut opts = ConnectOptions::new(self.url.clone());
        opts.max_connections(self.max_connections)
            .acquire_timeout(self.query_timeout)
            .sqlx_logging(false);

        tracing::info!(max_connections = self.max_connections, "connecting to database");
        Database::connect(opts).await
    }
}
