//! Configuration loader.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_str(&content)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Substitute `${VAR}` and `${VAR:-fallback}` from the environment.
    /// An unset variable without a fallback is an error.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let pattern = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").map_err(|e| {
            ConfigError::InvalidValue {
                field: "env".to_string(),
                message: e.to_string(),
            }
        })?;

        let mut missing = None;
        let expanded = pattern.replace_all(content, |caps: &regex::Captures<'_>| {
            match (std::env::var(&caps[1]), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(fallback)) => fallback.as_str().to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| caps[1].to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(ConfigError::EnvVarNotSet(name)),
            None => Ok(expanded.into_owned()),
        }
    }

    /// Expand shell-style paths (e.g., `~/.contexta`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}
