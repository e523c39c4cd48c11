//! Configuration management for the Stockbill client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with STOCKBILL__ prefix

use std::path::PathBuf;
use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// REST backend connection
    pub api: ApiConfig,

    /// Session persistence
    pub session: SessionConfig,

    /// Low stock alert defaults
    pub alerts: AlertsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the inventory API, without trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// File holding the persisted bearer token
    pub token_path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertsConfig {
    /// Quantity below which items are reported as low stock
    pub low_stock_threshold: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKBILL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::defaults(config::Config::builder(), &environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKBILL__ prefix)
            .add_source(
                Environment::with_prefix("STOCKBILL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Config>()?.validated()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("environment", environment)?
            .set_default("api.base_url", "http://localhost:8000")?
            .set_default("api.timeout_secs", 30)?
            .set_default("session.token_path", ".stockbill/session.json")?
            .set_default(
                "alerts.low_stock_threshold",
                shared::DEFAULT_LOW_STOCK_THRESHOLD,
            )
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.api.base_url = self.api.base_url.trim_end_matches('/').to_string();
        if self.api.base_url.is_empty() {
            return Err(ConfigError::Message("api.base_url must not be empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Message("api.timeout_secs must be positive".into()));
        }
        shared::validate_alert_threshold(self.alerts.low_stock_threshold)
            .map_err(|msg| ConfigError::Message(msg.to_string()))?;
        Ok(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api: ApiConfig::default(),
            session: SessionConfig {
                token_path: PathBuf::from(".stockbill/session.json"),
            },
            alerts: AlertsConfig {
                low_stock_threshold: shared::DEFAULT_LOW_STOCK_THRESHOLD,
            },
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}
