//! Log subscriber setup
//!
//! The core only emits through the `tracing` macros. Installing a subscriber
//! is left to the binary, which calls [`init`] once at startup. Logs go to
//! stderr so stdout stays free for command output.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{HeraldError, Result};

/// Build the filter: `RUST_LOG` when set, otherwise the configured directives
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| {
            HeraldError::Configuration(format!("Invalid log filter '{}': {}", config.filter, e))
        }),
    }
}

/// Install the global `tracing` subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| HeraldError::Other(format!("Failed to install log subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            filter: "herald=notalevel".into(),
            format: LogFormat::Pretty,
        };
        assert!(matches!(env_filter(&config), Err(HeraldError::Configuration(_))));
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
