use crate::domain::FeedKind;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub source_url: String,
    pub feed: FeedKind,
    pub numerology_path: Option<String>,
    pub apps_path: Option<String>,
    pub poll_interval_ms: u64,
    pub timestamp_refresh_ms: u64,
    pub request_timeout_ms: u64,
    pub forward_count: u64,
    pub backfill_count: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let source_url = env_map
            .get("BOOSTLINE_SOURCE_URL")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("BOOSTLINE_SOURCE_URL".to_string()))?;

        let feed = env_map
            .get("FEED")
            .map(|s| s.as_str())
            .unwrap_or("boosts")
            .parse::<FeedKind>()
            .map_err(|msg| ConfigError::InvalidValue("FEED".to_string(), msg))?;

        let numerology_path = optional_path(&env_map, "NUMEROLOGY_PATH");
        let apps_path = optional_path(&env_map, "APPS_PATH");

        let poll_interval_ms = parse_positive(&env_map, "POLL_INTERVAL_MS", 7000)?;
        let timestamp_refresh_ms = parse_positive(&env_map, "TIMESTAMP_REFRESH_MS", 60000)?;
        let request_timeout_ms = parse_positive(&env_map, "REQUEST_TIMEOUT_MS", 5000)?;
        let forward_count = parse_positive(&env_map, "FORWARD_COUNT", 20)?;
        let backfill_count = parse_positive(&env_map, "BACKFILL_COUNT", 100)?;

        Ok(Config {
            port,
            source_url,
            feed,
            numerology_path,
            apps_path,
            poll_interval_ms,
            timestamp_refresh_ms,
            request_timeout_ms,
            forward_count,
            backfill_count,
        })
    }
}

fn optional_path(env_map: &HashMap<String, String>, key: &str) -> Option<String> {
    env_map
        .get(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_positive(
    env_map: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(raw) => match raw.parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidValue(
                key.to_string(),
                "must be a positive integer".to_string(),
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "BOOSTLINE_SOURCE_URL".to_string(),
            "http://localhost:2112".to_string(),
        );
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.feed, FeedKind::Boosts);
        assert_eq!(config.poll_interval_ms, 7000);
        assert_eq!(config.timestamp_refresh_ms, 60000);
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.forward_count, 20);
        assert_eq!(config.backfill_count, 100);
        assert_eq!(config.numerology_path, None);
        assert_eq!(config.apps_path, None);
    }

    #[test]
    fn test_missing_source_url() {
        let mut env_map = setup_required_env();
        env_map.remove("BOOSTLINE_SOURCE_URL");
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "BOOSTLINE_SOURCE_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_feed() {
        let mut env_map = setup_required_env();
        env_map.insert("FEED".to_string(), "invoices".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "FEED"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_sent_feed() {
        let mut env_map = setup_required_env();
        env_map.insert("FEED".to_string(), "sent".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.feed, FeedKind::Sent);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("POLL_INTERVAL_MS".to_string(), "0".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "POLL_INTERVAL_MS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_blank_paths_are_unset() {
        let mut env_map = setup_required_env();
        env_map.insert("NUMEROLOGY_PATH".to_string(), "  ".to_string());
        env_map.insert("APPS_PATH".to_string(), "webroot/apps.json".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.numerology_path, None);
        assert_eq!(config.apps_path.as_deref(), Some("webroot/apps.json"));
    }
}
