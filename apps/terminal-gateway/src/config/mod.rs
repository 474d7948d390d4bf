//! Configuration module for the terminal gateway.
//!
//! Loads a YAML file with environment variable interpolation and validates
//! it. Every section is optional; a missing file yields the defaults.
//!
//! # Usage
//!
//! ```rust,ignore
//! use terminal_gateway::config::load_config;
//!
//! // Load from default path (config.yaml, or $GATEWAY_CONFIG)
//! let config = load_config(None)?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod execution;
mod observability;
mod server;
mod terminal;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use execution::ExecutionConfig;
pub use observability::{LogFormat, LoggingConfig, ObservabilityConfig};
pub use server::ServerConfig;
pub use terminal::TerminalConfig;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "GATEWAY_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Terminal call policy.
    #[serde(default)]
    pub terminal: TerminalConfig,
    /// Execution tag and comments.
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// The path defaults to `$GATEWAY_CONFIG`, then `config.yaml`. A missing
/// file is not an error: the defaults are returned.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(
        || std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        str::to_string,
    );

    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => return Err(ConfigError::ReadError { path, source: e }),
    };

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    if interpolated.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.http_port == config.server.metrics_port {
        return Err(ConfigError::ValidationError(
            "http_port and metrics_port must be different".to_string(),
        ));
    }

    if config.server.bind_address.parse::<std::net::IpAddr>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "bind_address '{}' is not an IP address",
            config.server.bind_address
        )));
    }

    if config.terminal.call_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "terminal.call_timeout_ms must be positive".to_string(),
        ));
    }

    if config.execution.comment.is_empty() || config.execution.close_comment.is_empty() {
        return Err(ConfigError::ValidationError(
            "execution.comment and execution.close_comment must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::shared::Timestamp;
    use crate::domain::trading::ExecutionTag;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.http_port, 5000);
        assert_eq!(config.server.metrics_port, 9090);
        assert_eq!(config.terminal.call_timeout_ms, 10_000);
        assert_eq!(config.terminal.price_deviation_points, 20);
        assert_eq!(config.execution.tag, ExecutionTag::new(2025));
        assert_eq!(config.execution.comment, "SIGNALIST Bot");
        assert_eq!(config.execution.close_comment, "SIGNALIST Bot Close");
        assert_eq!(
            config.execution.history_epoch,
            Timestamp::parse("2020-01-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_load_minimal_config() {
        let yaml = r"
server:
  http_port: 8080
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.terminal, TerminalConfig::default());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(load_config_from_string("").unwrap(), Config::default());
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "tag: ${GATEWAY_CONFIG_TEST_NONEXISTENT_VAR:-77}";
        assert_eq!(interpolate_env_vars(input), "tag: 77");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "comment: ${GATEWAY_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "comment: ");
    }

    #[test]
    fn test_validation_same_ports() {
        let yaml = r"
server:
  http_port: 9090
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for duplicate ports");
        };
        assert!(err.to_string().contains("must be different"));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let yaml = r"
terminal:
  call_timeout_ms: 0
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero timeout");
        };
        assert!(err.to_string().contains("call_timeout_ms"));
    }

    #[test]
    fn test_validation_bad_bind_address() {
        let yaml = r#"
server:
  bind_address: "localhost"
"#;

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for bind address");
        };
        assert!(err.to_string().contains("bind_address"));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
server:
  http_port: 5001
  bind_address: "127.0.0.1"
  metrics_port: 9191

terminal:
  call_timeout_ms: 2500
  price_deviation_points: 10

execution:
  tag: 4242
  comment: "Desk"
  close_comment: "Desk Close"
  history_epoch: "2023-06-01T00:00:00Z"

observability:
  logging:
    level: "debug"
    format: "pretty"
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.metrics_port, 9191);
        assert_eq!(config.terminal.call_timeout().as_millis(), 2500);
        assert_eq!(config.terminal.price_deviation_points, 10);
        assert_eq!(config.execution.tag, ExecutionTag::new(4242));
        assert_eq!(config.execution.close_comment, "Desk Close");
        assert_eq!(
            config.execution.history_epoch,
            Timestamp::parse("2023-06-01T00:00:00Z").unwrap()
        );
        assert_eq!(config.observability.logging.level, "debug");
        assert_eq!(config.observability.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "execution:\n  tag: 9").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.execution.tag, ExecutionTag::new(9));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config, Config::default());
    }
}
