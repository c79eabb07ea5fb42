//! Configuration loading.
//!
//! Configuration is assembled in three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A JSON file, either passed via `--config` or found at the default
//!    location:
//!    - **Linux/macOS:** `~/.wesign-mcp/config.json`
//!    - **Windows:** `%USERPROFILE%\.wesign-mcp\config.json`
//! 3. Environment variables: `WESIGN_API_URL`, `WESIGN_EMAIL`,
//!    `WESIGN_PASSWORD`, `WESIGN_PERSISTENT`, `PORT`
//!
//! An explicitly passed file must exist; the default location is optional.

mod settings;

pub use settings::{Config, Credentials, LoggingConfig, ServerConfig};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".wesign-mcp"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads the configuration file (if any), applies process environment
/// overrides and validates the result.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly passed configuration file does not exist
/// - The file cannot be read or the JSON is malformed
/// - An environment variable holds an unusable value
/// - The merged configuration fails validation
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with_env(path, |name| std::env::var(name).ok())
}

/// Same as [`load_config`] with an injectable environment lookup.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            })
        }
        Some(p) => read_file(p)?,
        None => match default_config_path() {
            Some(p) if p.exists() => read_file(&p)?,
            _ => Config::default(),
        },
    };

    apply_env(&mut config, env)?;
    config.validate()?;

    Ok(config)
}

fn read_file(config_path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.to_path_buf(),
        source: e,
    })
}

fn apply_env<F>(config: &mut Config, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("WESIGN_API_URL") {
        config.api_url = url;
    }
    if let Some(email) = non_empty("WESIGN_EMAIL") {
        config.email = Some(email);
    }
    if let Some(password) = non_empty("WESIGN_PASSWORD") {
        config.password = Some(password);
    }
    if let Some(persistent) = non_empty("WESIGN_PERSISTENT") {
        config.persistent = persistent == "true";
    }
    if let Some(port) = non_empty("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { name: "PORT" })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn default_config_path_exists() {
        let path = default_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("config.json"));
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let result = load_config_with_env(Some(Path::new("/nonexistent/wesign.json")), |_| None);
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api_url": "https://from-file.example.com", "server": {{"port": 4000}}}}"#
        )
        .unwrap();

        let env = env_from(&[
            ("WESIGN_API_URL", "https://from-env.example.com"),
            ("WESIGN_EMAIL", "ops@example.com"),
            ("WESIGN_PASSWORD", "secret"),
            ("WESIGN_PERSISTENT", "true"),
            ("PORT", "8080"),
        ]);

        let config = load_config_with_env(Some(file.path()), env).unwrap();
        assert_eq!(config.api_url, "https://from-env.example.com");
        assert_eq!(config.server.port, 8080);
        assert!(config.persistent);
        assert!(config.credentials().is_some());
    }

    #[test]
    fn persistent_requires_exact_true() {
        let mut config = Config::default();
        apply_env(&mut config, env_from(&[("WESIGN_PERSISTENT", "yes")])).unwrap();
        assert!(!config.persistent);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut config = Config::default();
        let result = apply_env(&mut config, env_from(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { name: "PORT" })));
    }
}
