use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const CONFIG_DIR: &str = "config";

/// Application configuration for the shipment core.
///
/// Loaded from `config/default.toml`, an environment-specific overlay, and
/// `FREIGHTLINE_*` environment variables, in that order of precedence.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Base URL of the collaborator persistence API, e.g.
    /// `https://api.example.com/v1`.
    #[validate(url(message = "collaborator_base_url must be a valid URL"))]
    pub collaborator_base_url: String,

    /// Per-request timeout for collaborator calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Runtime environment name ("development", "test", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Log level filter for the slog/tracing stack.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl AppConfig {
    /// Construct a configuration directly; used by tests and embedders that
    /// do not read config files.
    pub fn new(collaborator_base_url: String, environment: String) -> Self {
        Self {
            collaborator_base_url,
            request_timeout_secs: default_request_timeout_secs(),
            environment,
            log_level: default_log_level(),
        }
    }

    /// Load configuration from the config directory and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let mut builder = Config::builder()
            .add_source(File::from(Path::new(CONFIG_DIR).join("default")).required(false))
            .add_source(File::from(Path::new(CONFIG_DIR).join(&run_env)).required(false))
            .add_source(Environment::with_prefix("FREIGHTLINE").separator("__"));

        builder = builder.set_default("environment", run_env)?;

        let config: Self = builder.build()?.try_deserialize()?;
        config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
