use serde::Deserialize;
use std::time::Duration;

use crate::client::RetryPolicy;
use crate::collector::CollectorConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    pub collection: CollectionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub subscription_id: String,
    pub resource_group: String,
    /// Environment variable holding the bearer token. The token is supplied
    /// by the deployment; this service never refreshes it.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_token_env() -> String {
    "FLEETMON_API_TOKEN".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_wait_min_ms")]
    pub wait_min_ms: u64,
    #[serde(default = "default_wait_max_ms")]
    pub wait_max_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_wait_min_ms() -> u64 {
    1000
}

fn default_wait_max_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    4
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            wait_min_ms: default_wait_min_ms(),
            wait_max_ms: default_wait_max_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    /// Node identity reported in the summary.
    pub node_name: String,
    #[serde(default = "default_validity_window_secs")]
    pub validity_window_secs: u64,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// How often the background worker refreshes the cache.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// How often to log app stats (rounds succeeded/failed) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_validity_window_secs() -> u64 {
    60
}

fn default_max_concurrent_fetches() -> usize {
    10
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_stats_log_interval_secs() -> u64 {
    300
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            wait_min: Duration::from_millis(self.retry.wait_min_ms),
            wait_max: Duration::from_millis(self.retry.wait_max_ms),
            max_attempts: self.retry.max_attempts,
        }
    }

    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            node_name: self.collection.node_name.clone(),
            validity_window: Duration::from_secs(self.collection.validity_window_secs),
            max_concurrent_fetches: self.collection.max_concurrent_fetches,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            url::Url::parse(&self.api.base_url).is_ok(),
            "api.base_url must be a valid url, got {:?}",
            self.api.base_url
        );
        anyhow::ensure!(
            !self.api.subscription_id.is_empty(),
            "api.subscription_id must be non-empty"
        );
        anyhow::ensure!(
            !self.api.resource_group.is_empty(),
            "api.resource_group must be non-empty"
        );
        anyhow::ensure!(
            !self.api.token_env.is_empty(),
            "api.token_env must be non-empty"
        );
        anyhow::ensure!(
            self.retry.wait_min_ms > 0,
            "retry.wait_min_ms must be > 0, got {}",
            self.retry.wait_min_ms
        );
        anyhow::ensure!(
            self.retry.wait_min_ms <= self.retry.wait_max_ms,
            "retry.wait_min_ms must be <= retry.wait_max_ms, got {} > {}",
            self.retry.wait_min_ms,
            self.retry.wait_max_ms
        );
        anyhow::ensure!(
            self.retry.max_attempts > 0,
            "retry.max_attempts must be > 0, got {}",
            self.retry.max_attempts
        );
        anyhow::ensure!(
            !self.collection.node_name.is_empty(),
            "collection.node_name must be non-empty"
        );
        anyhow::ensure!(
            self.collection.validity_window_secs > 0,
            "collection.validity_window_secs must be > 0, got {}",
            self.collection.validity_window_secs
        );
        anyhow::ensure!(
            self.collection.max_concurrent_fetches > 0,
            "collection.max_concurrent_fetches must be > 0, got {}",
            self.collection.max_concurrent_fetches
        );
        anyhow::ensure!(
            self.collection.poll_interval_secs > 0,
            "collection.poll_interval_secs must be > 0, got {}",
            self.collection.poll_interval_secs
        );
        anyhow::ensure!(
            self.collection.stats_log_interval_secs > 0,
            "collection.stats_log_interval_secs must be > 0, got {}",
            self.collection.stats_log_interval_secs
        );
        Ok(())
    }
}
