//! Error types for configuration loading.
//!
//! # Security Note
//!
//! Error messages never include credentials. Variants that could carry the
//! configured password or tokens describe the problem generically instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// An environment variable held a value that could not be used.
    #[error("invalid value for environment variable {name}")]
    InvalidEnv {
        /// Variable name (the value is deliberately omitted).
        name: &'static str,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn invalid_env_names_variable_only() {
        let error = ConfigError::InvalidEnv { name: "PORT" };
        assert_eq!(error.to_string(), "invalid value for environment variable PORT");
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "api_url must use http or https".to_string(),
        };
        assert!(error.to_string().contains("http or https"));
    }
}
