//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::MonitorConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_BIND: &str = "TASKFLOW_MONITOR_BIND";
pub const ENV_API_KEY: &str = "TASKFLOW_MONITOR_API_KEY";
pub const ENV_LOG_LEVEL: &str = "TASKFLOW_MONITOR_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file, then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Defaults plus environment overrides, for running without a file.
pub fn default_config() -> Result<MonitorConfig, ConfigError> {
    let mut config = MonitorConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn parse_config(
    content: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<MonitorConfig, ConfigError> {
    let mut config: MonitorConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_env_overrides(&mut config, env);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env_overrides(config: &mut MonitorConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(bind) = env(ENV_BIND) {
        config.listener.bind_address = bind;
    }
    if let Some(key) = env(ENV_API_KEY) {
        config.auth.api_key = Some(key);
    }
    if let Some(level) = env(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }
}
