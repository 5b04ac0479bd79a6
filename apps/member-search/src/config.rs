use std::env;

use thiserror::Error;

use crate::domain::search::PageRequest;
use crate::errors::QueryResult;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PAGE_SIZE: u32 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Runtime settings read from the environment (and `.env`, if present)
///
/// Without `DATABASE_URL` the application runs against the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: Option<DatabaseConfig>,
    pub default_page_size: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_connections =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let default_page_size = parse_or(&lookup, "DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if default_page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_PAGE_SIZE",
                value: "0".to_string(),
            });
        }

        let database = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections,
            });

        Ok(Self {
            database,
            default_page_size,
        })
    }

    /// First page of the configured default size
    pub fn first_page(&self) -> QueryResult<PageRequest> {
        PageRequest::of(0, self.default_page_size)
    }
}

fn parse_or<F>(lookup: &F, key: &'static str, default: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_database() {
        let config = config(&[]).unwrap();

        assert!(config.database.is_none());
        assert_eq!(config.default_page_size, 3);
        assert_eq!(config.first_page().unwrap().page_size(), 3);
    }

    #[test]
    fn database_url_enables_postgres() {
        let config = config(&[
            ("DATABASE_URL", "postgresql://localhost/members"),
            ("DATABASE_MAX_CONNECTIONS", "10"),
        ])
        .unwrap();

        let database = config.database.unwrap();
        assert_eq!(database.url, "postgresql://localhost/members");
        assert_eq!(database.max_connections, 10);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert_eq!(
            config(&[("DEFAULT_PAGE_SIZE", "three")]),
            Err(ConfigError::Invalid {
                key: "DEFAULT_PAGE_SIZE",
                value: "three".to_string()
            })
        );
        assert!(config(&[("DEFAULT_PAGE_SIZE", "0")]).is_err());
    }
}
