//! Runtime configuration loaded from the environment (and `.env` via dotenvy)

use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";
pub const DEFAULT_TOPIC_TX_SENDER: &str = "topic-tx-sender";
pub const DEFAULT_TOPIC_TX_SIGNER: &str = "topic-tx-signer";
pub const DEFAULT_CHAIN_REGISTRY_URL: &str = "http://localhost:8081";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Kafka-style topic names the dispatcher publishes to
#[derive(Debug, Clone)]
pub struct TopicConfig {
    pub sender: String,
    pub signer: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            sender: DEFAULT_TOPIC_TX_SENDER.to_string(),
            signer: DEFAULT_TOPIC_TX_SIGNER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub nats_url: String,
    pub topics: TopicConfig,
    pub dispatch_timeout: Duration,
    pub chain_registry_url: String,
    pub registry_cache_ttl: Duration,
    /// Zero disables the transaction sentry
    pub sentry_interval: Duration,
    pub sentry_max_retries: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            nats_url: env::var("NATS_URL").unwrap_or_else(|_| DEFAULT_NATS_URL.to_string()),
            topics: TopicConfig {
                sender: env::var("TOPIC_TX_SENDER").unwrap_or_else(|_| DEFAULT_TOPIC_TX_SENDER.to_string()),
                signer: env::var("TOPIC_TX_SIGNER").unwrap_or_else(|_| DEFAULT_TOPIC_TX_SIGNER.to_string()),
            },
            dispatch_timeout: Duration::from_millis(parse_var("DISPATCH_TIMEOUT_MS", 5000)?),
            chain_registry_url: env::var("CHAIN_REGISTRY_URL")
                .unwrap_or_else(|_| DEFAULT_CHAIN_REGISTRY_URL.to_string()),
            registry_cache_ttl: Duration::from_secs(parse_var("REGISTRY_CACHE_TTL_SECS", 60)?),
            sentry_interval: Duration::from_secs(parse_var("SENTRY_INTERVAL_SECS", 5)?),
            sentry_max_retries: parse_var("SENTRY_MAX_RETRIES", 10)?,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
