//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    default_config_path, legacy_config_path, load_config, load_yaml_config, TOKEN_ENV, URL_ENV,
};
use crate::error::ConfigError;

/// Root URL of the current version of the mktmpio HTTP API
pub const DEFAULT_URL: &str = "https://mktmp.io/api/v1";

/// Port serving attach connections when the API is reached over HTTPS
pub const DEFAULT_ATTACH_PORT: u16 = 8443;

/// Settings for talking to the mktmpio service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API token sent as `X-Auth-Token`
    pub token: String,

    /// Base URL of the REST API; the attach endpoint is derived from it
    pub url: String,

    /// Value of the `User-Agent` header
    pub user_agent: String,

    /// Override for the secure attach port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach_port: Option<u16>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            url: DEFAULT_URL.to_string(),
            user_agent: concat!("mktmpio-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            attach_port: None,
        }
    }
}

/// Values layered on top of a loaded configuration
///
/// Empty strings are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub token: Option<String>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub attach_port: Option<u16>,
}

impl ConfigOverrides {
    /// Read overrides from `MKTMPIO_TOKEN` and `MKTMPIO_URL`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            token: lookup(TOKEN_ENV),
            url: lookup(URL_ENV),
            ..Self::default()
        }
    }
}

impl ClientConfig {
    /// Layer overrides on top of this configuration
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        fn set(field: &mut String, value: Option<String>) {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                *field = value;
            }
        }

        set(&mut self.token, overrides.token);
        set(&mut self.url, overrides.url);
        set(&mut self.user_agent, overrides.user_agent);
        if overrides.attach_port.is_some() {
            self.attach_port = overrides.attach_port;
        }
        self
    }

    /// Build the effective configuration: defaults, then the config file,
    /// then environment overrides.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// used when present, then `~/.mktmpio.yml`.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => load_config(path)?,
            None => Self::load_default(&default_config_path(), legacy_config_path().as_deref())?,
        };

        Ok(file_config.apply(ConfigOverrides::from_env()))
    }

    /// Load the TOML file at `primary`, else the YAML file at `legacy`,
    /// else defaults
    pub fn load_default(primary: &Path, legacy: Option<&Path>) -> Result<Self, ConfigError> {
        if primary.exists() {
            return load_config(primary);
        }

        match legacy {
            Some(legacy) if legacy.exists() => {
                tracing::debug!("Reading legacy config file {:?}", legacy);
                let mut config: Self = load_yaml_config(legacy)?;
                if config.url.trim().is_empty() {
                    config.url = DEFAULT_URL.to_string();
                }
                Ok(config)
            }
            _ => {
                tracing::debug!("No config file at {:?}, using defaults", primary);
                Ok(Self::default())
            }
        }
    }

    /// Check that the configuration can authenticate against the service
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid("url must not be empty".to_string()));
        }
        Ok(())
    }

    /// Port used for secure attach connections
    pub fn secure_attach_port(&self) -> u16 {
        self.attach_port.unwrap_or(DEFAULT_ATTACH_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.url, DEFAULT_URL);
        assert!(config.user_agent.starts_with("mktmpio-rs/"));
        assert_eq!(config.secure_attach_port(), 8443);
        assert!(config.token.is_empty());
    }

    #[test]
    fn test_apply_overrides_non_empty_fields() {
        let base = ClientConfig {
            token: "ATOK".to_string(),
            ..ClientConfig::default()
        };

        let merged = base.clone().apply(ConfigOverrides {
            token: Some("BTOK".to_string()),
            ..ConfigOverrides::default()
        });
        assert_eq!(merged.token, "BTOK");
        assert_eq!(merged.url, base.url);

        let merged = base.clone().apply(ConfigOverrides {
            token: Some(String::new()),
            url: Some("http://localhost:3000/api".to_string()),
            attach_port: Some(9443),
            ..ConfigOverrides::default()
        });
        assert_eq!(merged.token, "ATOK");
        assert_eq!(merged.url, "http://localhost:3000/api");
        assert_eq!(merged.secure_attach_port(), 9443);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("MKTMPIO_TOKEN", "1234-5678-90abcdef"),
            ("MKTMPIO_URL", "http://127.0.0.1:8080"),
        ]
        .into_iter()
        .collect();

        let overrides = ConfigOverrides::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        let config = ClientConfig::default().apply(overrides);
        assert_eq!(config.token, "1234-5678-90abcdef");
        assert_eq!(config.url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ClientConfig = toml::from_str(r#"token = "01234567890abcdefghijkl""#).unwrap();
        assert_eq!(config.token, "01234567890abcdefghijkl");
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.attach_port, None);
    }

    #[test]
    fn test_resolve_explicit_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfig::resolve(Some(&dir.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_legacy_yaml_used_without_toml() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("config.toml");
        let legacy = dir.path().join(".mktmpio.yml");
        std::fs::write(&legacy, "token: 01234567890abcdefghijkl\nurl: \"\"\n").unwrap();

        let config = ClientConfig::load_default(&primary, Some(&legacy)).unwrap();
        assert_eq!(config.token, "01234567890abcdefghijkl");
        assert_eq!(config.url, DEFAULT_URL);
    }

    #[test]
    fn test_toml_preferred_over_legacy_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("config.toml");
        let legacy = dir.path().join(".mktmpio.yml");
        std::fs::write(&primary, "token = \"from-toml\"\n").unwrap();
        std::fs::write(&legacy, "token: from-yaml\n").unwrap();

        let config = ClientConfig::load_default(&primary, Some(&legacy)).unwrap();
        assert_eq!(config.token, "from-toml");
    }

    #[test]
    fn test_no_config_files_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_default(
            &dir.path().join("config.toml"),
            Some(&dir.path().join(".mktmpio.yml")),
        )
        .unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            ClientConfig::default().validate(),
            Err(ConfigError::MissingToken)
        ));

        let config = ClientConfig {
            token: "abcdefg".to_string(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
