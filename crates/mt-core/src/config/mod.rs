//! Configuration management for the mktmpio client

mod client;

pub use client::{ClientConfig, ConfigOverrides, DEFAULT_ATTACH_PORT, DEFAULT_URL};

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "MKTMPIO_TOKEN";

/// Environment variable holding the API base URL
pub const URL_ENV: &str = "MKTMPIO_URL";

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mktmpio")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Location of the YAML config file written by earlier mktmpio clients
///
/// Read only when no TOML config exists.
pub fn legacy_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mktmpio.yml"))
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load configuration from a YAML file
pub fn load_yaml_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    Ok(serde_yaml::from_str(&content)?)
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_layout() {
        let path = default_config_path();
        assert!(path.ends_with("mktmpio/config.toml"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<ClientConfig, _> = load_config(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = ClientConfig {
            token: "New Token".to_string(),
            ..ClientConfig::default()
        };
        save_config(&path, &config).unwrap();

        let loaded: ClientConfig = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_legacy_path_layout() {
        if let Some(path) = legacy_config_path() {
            assert!(path.ends_with(".mktmpio.yml"));
        }
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mktmpio.yml");
        std::fs::write(&path, "token: 01234567890abcdefghijkl\n").unwrap();

        let loaded: ClientConfig = load_yaml_config(&path).unwrap();
        assert_eq!(loaded.token, "01234567890abcdefghijkl");
        assert_eq!(loaded.url, DEFAULT_URL);
    }

    #[test]
    fn test_load_malformed_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mktmpio.yml");
        std::fs::write(&path, "token: [unterminated").unwrap();

        let result: Result<ClientConfig, _> = load_yaml_config(&path);
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "token = [unterminated").unwrap();

        let result: Result<ClientConfig, _> = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
