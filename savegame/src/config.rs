use std::path::{Path, PathBuf};
use std::time::Duration;

use database::{DatabaseConfig, RetryPolicy};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub database: DatabaseSection,
    pub save_retry: RetrySection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: database::config::DEFAULT_POOL_SIZE,
            busy_timeout_ms: database::config::DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
        }
    }
}

/// How often the service re-sends a save that lost a race with a concurrent writer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
        }
    }
}

impl ServiceConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn database_config(&self, cli_url: Option<String>) -> DatabaseConfig {
        let mut config = DatabaseConfig::from_cli_or_env_or_yaml(cli_url, self.database.url.clone());
        config.pool_size = self.database.pool_size;
        config.busy_timeout = Duration::from_millis(self.database.busy_timeout_ms);
        config
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.save_retry.max_retries,
            initial_delay: Duration::from_millis(self.save_retry.initial_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = ServiceConfig::from_yaml_str("{}").expect("parse");
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.retry_policy().max_retries, 3);
        assert_eq!(config.database.busy_timeout_ms, 5000);
    }

    #[test]
    fn test_yaml_overrides() {
        let config = ServiceConfig::from_yaml_str(
            r#"
database:
  url: saves.db
  pool_size: 4
save_retry:
  max_retries: 0
"#,
        )
        .expect("parse");

        assert_eq!(config.database.url.as_deref(), Some("saves.db"));
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.save_retry.max_retries, 0);
        assert_eq!(config.save_retry.initial_delay_ms, 25);

        let db = config.database_config(Some("cli.db".to_string()));
        assert_eq!(db.url, "cli.db");
        assert_eq!(db.pool_size, 4);
    }

    #[test]
    fn test_unknown_shape_is_an_error() {
        let err = ServiceConfig::from_yaml_str("database: [1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ServiceConfig::load(Path::new("/nonexistent/savegame.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
