//! Error types for configuration validation and loading

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a projection refuses to run
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    #[error("invalid rate: {name} = {value} (must be finite and greater than -100%)")]
    InvalidRate { name: &'static str, value: f64 },
}

impl ProjectionError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ProjectionError::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures while reading configuration or estimate files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ProjectionError),
}
