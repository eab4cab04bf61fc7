use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "API_KEY";

/// On-disk configuration, a development convenience for running without the
/// environment variable set.
///
/// Example TOML:
/// api_key = "..."
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,
}

impl Config {
    /// Resolve the provider credential once at startup: the process
    /// environment wins, the config file is the fallback.
    ///
    /// Returns `Ok(None)` when neither is set. That is not an error here;
    /// requests made without a key are rejected upstream and surface through
    /// the provider's own error message.
    pub fn resolve_api_key() -> Result<Option<String>> {
        if let Ok(key) = env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(Some(key));
            }
        }

        Ok(Self::load()?.api_key)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weathercheck", "weathercheck")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_key() {
        let cfg = Config::default();
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn parses_api_key_from_toml() {
        let cfg: Config = toml::from_str("api_key = \"SECRET\"").expect("valid toml");
        assert_eq!(cfg.api_key.as_deref(), Some("SECRET"));
    }

    #[test]
    fn empty_toml_parses_to_default() {
        let cfg: Config = toml::from_str("").expect("valid toml");
        assert!(cfg.api_key.is_none());
    }
}
