use std::path::PathBuf;

use thiserror::Error;

/// Faults of the host layer.
///
/// Problems in the scanned sources are [`crate::Diagnostic`]s, not errors.
/// This type covers what stops the generator from running at all: unreadable
/// files, a broken manifest or configuration, a missing build environment.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to render {name}: {message}")]
    Render { name: String, message: String },

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

pub type Result<T, E = GeneratorError> = std::result::Result<T, E>;
