//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_names_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("/etc/contexta/default.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let display = err.to_string();
        assert!(display.contains("/etc/contexta/default.toml"));
        assert!(display.contains("permission denied"));
    }

    #[test]
    fn test_invalid_value_names_field() {
        let err = ConfigError::InvalidValue {
            field: "fusion.vector_weight".to_string(),
            message: "weights must not be negative".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for fusion.vector_weight: weights must not be negative"
        );
    }

    #[test]
    fn test_env_var_not_set() {
        let err = ConfigError::EnvVarNotSet("OPENAI_API_KEY".to_string());
        assert!(err.to_string().ends_with("OPENAI_API_KEY"));
    }
}
