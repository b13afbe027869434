//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use mt_core::config::{self, ClientConfig, ConfigOverrides};
use mt_core::ConfigError;

use crate::output::{print_info, print_success, print_warning};

/// Keys accepted by `config get` and `config set`
const KEYS: &[&str] = &["token", "url", "user_agent", "attach_port"];

fn config_file(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path)
}

/// Build the effective configuration: file, environment, then flags
///
/// With `allow_missing` a missing config file falls back to the defaults.
pub fn resolve_config(
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
    allow_missing: bool,
) -> Result<ClientConfig> {
    let config = match ClientConfig::resolve(config_path) {
        Err(ConfigError::NotFound(path)) if allow_missing => {
            tracing::debug!("Config file {:?} not found, using defaults", path);
            ClientConfig::default().apply(ConfigOverrides::from_env())
        }
        other => other.context("Failed to load configuration")?,
    };
    Ok(config.apply(overrides))
}

/// Print a config value of the effective configuration
pub fn config_get(config: &ClientConfig, key: &str) -> Result<()> {
    let value = match key {
        "token" => config.token.clone(),
        "url" => config.url.clone(),
        "user_agent" => config.user_agent.clone(),
        "attach_port" => config.secure_attach_port().to_string(),
        _ => anyhow::bail!("Unknown config key '{}' (expected one of: {})", key, KEYS.join(", ")),
    };
    println!("{}", value);
    Ok(())
}

/// Set a value in the config file, creating the file if needed
pub fn config_set(config_path: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let path = config_file(config_path);

    let mut file_config: ClientConfig = if path.exists() {
        config::load_config(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?
    } else {
        print_info(&format!("Creating configuration file {:?}", path));
        // Carry over settings from ~/.mktmpio.yml when writing the default file
        let legacy = config_path.is_none().then(config::legacy_config_path).flatten();
        ClientConfig::load_default(&path, legacy.as_deref())
            .context("Failed to read legacy config file")?
    };

    match key {
        "token" => file_config.token = value.to_string(),
        "url" => file_config.url = value.to_string(),
        "user_agent" => file_config.user_agent = value.to_string(),
        "attach_port" => {
            let port = value
                .parse::<u16>()
                .with_context(|| format!("Invalid port: {}", value))?;
            file_config.attach_port = Some(port);
        }
        _ => anyhow::bail!("Unknown config key '{}' (expected one of: {})", key, KEYS.join(", ")),
    }

    config::save_config(&path, &file_config)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    let shown = if key == "token" { mask(value) } else { value.to_string() };
    print_success(&format!("Set {} = {}", key, shown));
    Ok(())
}

/// Show the effective configuration with the token masked
pub fn config_show(config_path: Option<&Path>, config: &ClientConfig) -> Result<()> {
    let path = config_file(config_path);
    if path.exists() {
        print_info(&format!("Configuration file: {:?}", path));
    } else {
        print_warning(&format!("No configuration file found at {:?}", path));
    }

    let shown = ClientConfig {
        token: mask(&config.token),
        attach_port: Some(config.secure_attach_port()),
        ..config.clone()
    };
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

/// Hide all but the last four characters of a secret
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}
