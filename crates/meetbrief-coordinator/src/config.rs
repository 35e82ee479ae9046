//! Configuration for the coordination service

use meetbrief_core::{DatabaseConfig, LlmConfig, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the coordinator service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Poll loop configuration
    #[serde(default)]
    pub poll: PollConfig,

    /// Result artifact storage configuration
    #[serde(default)]
    pub storage: ResultStorageConfig,

    /// Database configuration (uses meetbrief-core's database config)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chat-completion backend configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CoordinatorConfig {
    /// Load configuration from an optional `config.toml` plus
    /// `MEETBRIEF__`-prefixed environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or a value fails
    /// to deserialize.
    pub fn load() -> meetbrief_core::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("MEETBRIEF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| meetbrief_core::Error::configuration(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| meetbrief_core::Error::configuration(e.to_string()))
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Interval between poll ticks in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Sleep after a faulted tick, to avoid hot-looping on a broken store
    #[serde(default = "default_error_backoff")]
    pub error_backoff_seconds: u64,
}

impl PollConfig {
    /// Poll interval as a [`Duration`]
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Error backoff as a [`Duration`]
    #[must_use]
    pub const fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_seconds)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            error_backoff_seconds: default_error_backoff(),
        }
    }
}

/// Result artifact storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultStorageConfig {
    /// Directory for durable result artifacts
    #[serde(default = "default_results_directory")]
    pub results_directory: PathBuf,
}

impl Default for ResultStorageConfig {
    fn default() -> Self {
        Self {
            results_directory: default_results_directory(),
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,

    /// How long shutdown waits for in-flight analysis tasks before
    /// aborting them
    #[serde(default = "default_analysis_join_timeout")]
    pub analysis_join_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Shutdown timeout as a [`Duration`]
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }

    /// Analysis join timeout as a [`Duration`]
    #[must_use]
    pub const fn analysis_join_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_join_timeout_seconds)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
            analysis_join_timeout_seconds: default_analysis_join_timeout(),
        }
    }
}

// Default value functions
const fn default_poll_interval() -> u64 {
    2
}

const fn default_error_backoff() -> u64 {
    5
}

fn default_results_directory() -> PathBuf {
    PathBuf::from("data/results")
}

fn default_service_name() -> String {
    "meetbrief-coordinator".to_string()
}

const fn default_shutdown_timeout() -> u64 {
    30
}

const fn default_analysis_join_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_poll_config_defaults() {
        let config = PollConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.error_backoff(), Duration::from_secs(5));
    }

    #[test]
    fn test_service_config_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.name, "meetbrief-coordinator");
        assert!(config.shutdown_timeout() > Duration::ZERO);
        assert!(config.analysis_join_timeout() > Duration::ZERO);
    }

    #[test]
    fn test_storage_config_default_directory() {
        let config = ResultStorageConfig::default();
        assert_eq!(config.results_directory, PathBuf::from("data/results"));
    }

    #[test]
    fn test_coordinator_config_from_partial_toml() {
        let toml = r#"
            [poll]
            poll_interval_seconds = 1

            [llm]
            api_key = "sk-test"
        "#;

        let config: CoordinatorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.poll.poll_interval_seconds, 1);
        assert_eq!(config.poll.error_backoff_seconds, 5);
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.storage.results_directory, PathBuf::from("data/results"));
    }

    #[test]
    fn test_coordinator_config_serializes_to_toml() {
        let config = CoordinatorConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("poll_interval_seconds"));
        assert!(rendered.contains("results_directory"));
    }
}
