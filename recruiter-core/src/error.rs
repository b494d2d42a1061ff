//! Error types for recruiter-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading a settings file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required value is absent or blank after all layers were merged.
    #[error("configuration value '{key}' is required but was not found or is empty")]
    MissingField { key: &'static str },

    /// The endpoint is present but is not an absolute URL.
    #[error("configuration value 'azure_ai.endpoint' must be a valid absolute URL (got '{value}'): {reason}")]
    InvalidEndpoint { value: String, reason: String },

    /// An environment override could not be converted to the field's type.
    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidValue { var: String, value: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
