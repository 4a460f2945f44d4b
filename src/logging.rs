//! Logging setup for binaries embedding the resolver.
//!
//! The library only emits `tracing` events. Installing a subscriber is left
//! to the host process, which calls [`init`] once at startup.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ResolveError, ResolveResult};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Verbose configuration for local debugging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json: false,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Installs the global subscriber.
///
/// # Errors
/// Fails if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> ResolveResult<()> {
    let registry = tracing_subscriber::registry().with(config.filter());
    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    result.map_err(|e| ResolveError::internal(format!("failed to install subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
    }

    #[test]
    fn test_partial_json_config() {
        let config: LoggingConfig = serde_json::from_str(r#"{ "json": true }"#).unwrap();
        assert!(config.json);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::development();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
