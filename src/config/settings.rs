//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.
//! Every field has a default, so an empty object (or no file at all) is a
//! valid configuration.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Root URL of the WeSign deployment, without the `/userapi/v3` suffix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Account email used for automatic login.
    #[serde(default)]
    pub email: Option<String>,

    /// Account password used for automatic login.
    #[serde(default)]
    pub password: Option<String>,

    /// Whether automatic login should request a persistent session.
    #[serde(default)]
    pub persistent: bool,

    /// Per-request timeout for upstream calls, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Directory holding the markdown files served as MCP resources.
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            _schema: None,
            _comment: None,
            api_url: default_api_url(),
            email: None,
            password: None,
            persistent: false,
            request_timeout_secs: default_request_timeout(),
            resources_dir: None,
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError {
                message: format!("api_url '{}' must use http or https", self.api_url),
            });
        }

        if self.email.is_some() != self.password.is_some() {
            return Err(ConfigError::ValidationError {
                message: "email and password must be configured together".to_string(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                message: "request_timeout_secs must be greater than zero".to_string(),
            });
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "server.port must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the login credentials when both email and password are set.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some(Credentials {
                email: email.clone(),
                password: password.clone(),
                persistent: self.persistent,
            }),
            _ => None,
        }
    }
}

/// Account credentials for automatic login.
#[derive(Clone)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Persistent session requested.
    pub persistent: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("persistent", &self.persistent)
            .finish()
    }
}

fn default_api_url() -> String {
    "https://wse.comsigntrust.com".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_url, "https://wse.comsigntrust.com");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.server.port, 3000);
        assert!(config.credentials().is_none());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "api_url": "https://wesign.example.com",
            "email": "ops@example.com",
            "password": "hunter2",
            "persistent": true,
            "request_timeout_secs": 10,
            "resources_dir": "/opt/wesign/docs",
            "server": { "host": "0.0.0.0", "port": 8080 },
            "logging": { "level": "debug" }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.api_url, "https://wesign.example.com");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.resources_dir, Some(PathBuf::from("/opt/wesign/docs")));
        assert_eq!(config.logging.level, "debug");

        let creds = config.credentials().unwrap();
        assert_eq!(creds.email, "ops@example.com");
        assert!(creds.persistent);
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials {
            email: "ops@example.com".to_string(),
            password: "hunter2".to_string(),
            persistent: false,
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn reject_non_http_url() {
        let config: Config = serde_json::from_str(r#"{"api_url": "ftp://wesign"}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_email_without_password() {
        let config: Config = serde_json::from_str(r#"{"email": "a@b.c"}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_zero_timeout() {
        let config: Config = serde_json::from_str(r#"{"request_timeout_secs": 0}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"unknown_field": "value"}"#);
        assert!(result.is_err());
    }
}
