//! Configuration types for Herald

use serde::{Deserialize, Serialize};

use crate::error::{HeraldError, Result};

/// Default configuration file name, read from the working directory only
pub const CONFIG_FILE: &str = "herald.toml";

/// Environment variable naming an additional configuration file
pub const CONFIG_PATH_ENV: &str = "HERALD_CONFIG_PATH";

/// Prefix of environment overrides (`HERALD_TRACING__ENABLED=true`)
pub const ENV_PREFIX: &str = "HERALD_";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HeraldConfig {
    /// Span tracking configuration
    #[serde(default)]
    pub tracing: TracingConfig,

    /// Event envelope defaults
    #[serde(default)]
    pub events: EventsConfig,

    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Span tracking configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TracingConfig {
    /// Service name reported with every span; blank means "unknown-service"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,

    /// Enable span tracking
    #[serde(default)]
    pub enabled: bool,

    /// Forward span records to the export sink
    #[serde(default)]
    pub export_enabled: bool,
}

/// Defaults applied to envelopes built from configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct EventsConfig {
    /// Source used when the caller sets none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_source: Option<String>,

    /// Data content type used when the caller sets none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_data_content_type: Option<String>,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Builder for creating configurations
pub struct ConfigBuilder {
    config: HeraldConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: HeraldConfig::default(),
        }
    }

    /// Set tracing configuration
    pub fn tracing(mut self, config: TracingConfig) -> Self {
        self.config.tracing = config;
        self
    }

    /// Set event defaults
    pub fn events(mut self, config: EventsConfig) -> Self {
        self.config.events = config;
        self
    }

    /// Set logging configuration
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.config.logging = config;
        self
    }

    /// Build the configuration
    pub fn build(self) -> HeraldConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HeraldConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (`herald.toml`)
    /// 3. File named by `HERALD_CONFIG_PATH`
    /// 4. `HERALD_` environment variables, `__` separating nested keys
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(HeraldConfig::default()))
            .merge(Toml::file_exact(CONFIG_FILE));

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            figment = figment.merge(Toml::file_exact(path));
        }

        let config: HeraldConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| {
                HeraldError::Configuration(format!("Failed to load configuration: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let path = path.as_ref();
        if !path.exists() {
            return Err(HeraldError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let config: HeraldConfig = Figment::from(Serialized::defaults(HeraldConfig::default()))
            .merge(Toml::file_exact(path))
            .extract()
            .map_err(|e| {
                HeraldError::Configuration(format!("Failed to load configuration file: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Non-fatal notes are logged at DEBUG; they only appear once a
    /// subscriber is installed, so callers that set up logging from this
    /// configuration should validate again afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.logging.filter.trim().is_empty() {
            return Err(HeraldError::Configuration(
                "logging.filter must not be blank".to_string(),
            ));
        }

        if self.tracing.export_enabled && !self.tracing.enabled {
            tracing::debug!("Span export is enabled but tracing is disabled; export has no effect");
        }

        Ok(())
    }
}
