//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

/// Every variable is read with this prefix, e.g. `CURRENCY_SERVICE_DATABASE_URL`.
pub const ENV_PREFIX: &str = "CURRENCY_SERVICE_";

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub feed_url: String,
    /// Per-request timeout of the feed HTTP client.
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which receives full variable names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        let database_url = get("DATABASE_URL").ok_or_else(|| {
            anyhow::anyhow!("{ENV_PREFIX}DATABASE_URL environment variable is required")
        })?;

        Ok(Self {
            port: parse_or(&get, "SERVER_PORT", 8080)?,
            database_url,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 25)?,
            feed_url: get("FEED_URL").unwrap_or_else(|| currency_feed::DEFAULT_FEED_URL.to_string()),
            http_timeout: Duration::from_secs(parse_or(&get, "HTTP_TIMEOUT_SECS", 30)?),
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {ENV_PREFIX}{name}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("CURRENCY_SERVICE_DATABASE_URL", "sqlite::memory:")]).unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 25);
        assert_eq!(config.feed_url, "https://www.bank.lv/vk/ecb_rss.xml");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CURRENCY_SERVICE_DATABASE_URL", "postgres://localhost/rates"),
            ("CURRENCY_SERVICE_SERVER_PORT", "9090"),
            ("CURRENCY_SERVICE_DB_MAX_CONNECTIONS", "5"),
            ("CURRENCY_SERVICE_FEED_URL", "http://localhost:1234/feed.xml"),
            ("CURRENCY_SERVICE_HTTP_TIMEOUT_SECS", "3"),
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.feed_url, "http://localhost:1234/feed.xml");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_database_url_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("CURRENCY_SERVICE_DATABASE_URL"));
    }

    #[test]
    fn test_unprefixed_variables_are_ignored() {
        assert!(load(&[("DATABASE_URL", "sqlite::memory:")]).is_err());
    }

    #[test]
    fn test_invalid_number_names_the_variable() {
        let err = load(&[
            ("CURRENCY_SERVICE_DATABASE_URL", "sqlite::memory:"),
            ("CURRENCY_SERVICE_SERVER_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("CURRENCY_SERVICE_SERVER_PORT"));
    }
}
