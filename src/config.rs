//! Configuration for the notification pipeline.
//!
//! Values come from code (`with_*` builders), a TOML document, or the
//! process environment (after loading `.env` if one exists).

use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TOPIC: &str = "students";
pub const DEFAULT_BROKERS: &str = "localhost:9092";

pub const ENV_TOPIC: &str = "STUDENT_EVENTS_TOPIC";
pub const ENV_BROKERS: &str = "KAFKA_BROKERS";
pub const ENV_CLIENT_ID: &str = "KAFKA_CLIENT_ID";
pub const ENV_FLUSH_ATTEMPTS: &str = "STUDENT_EVENTS_FLUSH_ATTEMPTS";
pub const ENV_FLUSH_TIMEOUT_MS: &str = "STUDENT_EVENTS_FLUSH_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// How hard the publisher tries to get a record confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushPolicy {
    /// Flush calls per publish before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Timeout of each flush call, in milliseconds.
    #[serde(default = "default_flush_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_flush_timeout_ms() -> u64 {
    10_000
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            timeout_ms: default_flush_timeout_ms(),
        }
    }
}

impl FlushPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = millis(timeout);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Worst-case time a single publish can block.
    pub fn worst_case(&self) -> Duration {
        self.timeout().saturating_mul(self.max_attempts)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "flush.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Broker connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Comma-separated bootstrap broker list.
    #[serde(default = "default_brokers")]
    pub brokers: String,
    pub client_id: Option<String>,
    /// Delivery timeout the client applies to each record. Keep it above the
    /// flush budget, or the client may expire records while still retrying.
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
    /// Passed to the client verbatim.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

fn default_brokers() -> String {
    DEFAULT_BROKERS.to_string()
}

fn default_message_timeout_ms() -> u64 {
    300_000
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            brokers: default_brokers(),
            client_id: None,
            message_timeout_ms: default_message_timeout_ms(),
            options: BTreeMap::new(),
        }
    }
}

impl BrokerConfig {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            ..Default::default()
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout_ms = millis(timeout);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Top-level pipeline configuration.
///
/// ```
/// use student_events::PipelineConfig;
///
/// let config = PipelineConfig::from_toml_str(r#"
///     topic = "students"
///
///     [broker]
///     brokers = "kafka:9092"
///
///     [flush]
///     max_attempts = 5
/// "#).unwrap();
///
/// assert_eq!(config.flush.max_attempts, 5);
/// assert_eq!(config.flush.timeout_ms, 10_000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub flush: FlushPolicy,
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            broker: BrokerConfig::default(),
            flush: FlushPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new(topic: impl Into<String>, broker: BrokerConfig) -> Self {
        Self {
            topic: topic.into(),
            broker,
            flush: FlushPolicy::default(),
        }
    }

    pub fn with_flush_policy(mut self, flush: FlushPolicy) -> Self {
        self.flush = flush;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` (if present) and read overrides from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(topic) = lookup(ENV_TOPIC) {
            config.topic = topic;
        }
        if let Some(brokers) = lookup(ENV_BROKERS) {
            config.broker.brokers = brokers;
        }
        if let Some(client_id) = lookup(ENV_CLIENT_ID) {
            config.broker.client_id = Some(client_id);
        }
        if let Some(attempts) = parse_var(&lookup, ENV_FLUSH_ATTEMPTS)? {
            config.flush.max_attempts = attempts;
        }
        if let Some(timeout_ms) = parse_var(&lookup, ENV_FLUSH_TIMEOUT_MS)? {
            config.flush.timeout_ms = timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::Invalid("topic must not be empty".to_string()));
        }
        if self.broker.brokers.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "broker.brokers must not be empty".to_string(),
            ));
        }
        self.flush.validate()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { key, value }),
    }
}
