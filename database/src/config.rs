use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::DatabaseError;

pub const DEFAULT_POOL_SIZE: u32 = 20;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn from_cli_or_env_or_yaml(cli_arg: Option<String>, yaml_config: Option<String>) -> Self {
        let url = if let Some(arg) = cli_arg {
            arg
        } else if let Ok(env) = std::env::var("DATABASE_URL") {
            env
        } else if let Some(yaml) = yaml_config {
            yaml
        } else {
            "sqlite::memory:".to_string()
        };

        Self::new(url)
    }

    pub fn is_in_memory(&self) -> bool {
        matches!(self.url.as_str(), ":memory:" | "sqlite::memory:" | "sqlite://:memory:")
    }

    pub fn connect_options(&self) -> Result<SqliteConnectOptions, DatabaseError> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DatabaseError::Connection(e.to_string()))?
        } else if self.url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&self.url)
                .map_err(|e| DatabaseError::Connection(e.to_string()))?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        } else {
            SqliteConnectOptions::new()
                .filename(&self.url)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        Ok(options.foreign_keys(true).busy_timeout(self.busy_timeout))
    }

    pub async fn create_pool(&self) -> Result<sqlx::SqlitePool, DatabaseError> {
        let mut pool_options = SqlitePoolOptions::new().max_connections(self.pool_size.max(1));
        if self.is_in_memory() {
            // The database lives only as long as its connection.
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        pool_options
            .connect_with(self.connect_options()?)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))
    }
}
