//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file with environment variable
//! overrides for sensitive values like `DECKHAND_CLUSTER_TOKEN`. The only
//! state the daemon keeps is this configuration - everything else lives in
//! the cluster.
//!
//! # Example
//!
//! ```no_run
//! use deckhand::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("deckhand.toml")?;
//!     config.logging.init();
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;

/// Environment variable holding the cluster API bearer token.
pub const CLUSTER_TOKEN_ENV: &str = "DECKHAND_CLUSTER_TOKEN";

/// Cluster API connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    /// Base URL of the orchestrator API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer token; normally injected via `DECKHAND_CLUSTER_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,

    /// Restrict the daemon to one namespace. Unset means cluster-wide.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Outbound proxy for cluster API calls.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Per-request timeout; also bounds every deployer apply call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            namespace: None,
            proxy: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:8001".into()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Reconnect discipline for the event-stream connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectPolicy {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    #[serde(default = "default_cooldown_ms")]
    pub circuit_breaker_cooldown_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_consecutive_failures: default_max_consecutive_failures(),
            circuit_breaker_cooldown_ms: default_cooldown_ms(),
        }
    }
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_consecutive_failures() -> u32 {
    5
}

fn default_cooldown_ms() -> u64 {
    60_000
}

/// Event-stream connection settings. Absence of this section selects the
/// no-op consumer.
#[derive(Debug, Clone, Deserialize)]
pub struct EventStreamConfig {
    /// WebSocket URL publishing spec documents as JSON messages.
    pub ws_url: String,

    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

/// Periodic re-sync settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ResyncConfig {
    /// Seconds between re-sync passes.
    #[serde(default = "default_resync_interval_secs")]
    pub interval_secs: u64,
}

impl Default for ResyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_resync_interval_secs(),
        }
    }
}

fn default_resync_interval_secs() -> u64 {
    300
}

/// HTTP front-end settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
        }
    }
}

fn default_http_port() -> u16 {
    5000
}

/// Deploy queue policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueueConfig {
    /// Bounded capacity; unset means unbounded, non-blocking enqueue.
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Optional event stream; absent selects the no-op consumer.
    #[serde(default)]
    pub event_stream: Option<EventStreamConfig>,

    #[serde(default)]
    pub resync: ResyncConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from a TOML file, apply environment overrides, validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let mut config = Self::parse_toml(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without touching the environment.
    pub fn parse_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(ConfigError::Parse)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(CLUSTER_TOKEN_ENV) {
            if !token.is_empty() {
                self.cluster.token = Some(token);
            }
        }
    }

    /// Check cross-field consistency of the loaded values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster.api_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "cluster.api_url",
            });
        }
        url::Url::parse(&self.cluster.api_url).map_err(|err| ConfigError::InvalidValue {
            field: "cluster.api_url",
            reason: err.to_string(),
        })?;

        if let Some(stream) = &self.event_stream {
            url::Url::parse(&stream.ws_url).map_err(|err| ConfigError::InvalidValue {
                field: "event_stream.ws_url",
                reason: err.to_string(),
            })?;
        }

        if self.resync.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resync.interval_secs",
                reason: "must be positive".into(),
            });
        }
        if self.cluster.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cluster.timeout_secs",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}
