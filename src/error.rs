//! Error types shared by the conversion pipeline.

use std::path::PathBuf;

/// Errors that abort a conversion run or a single file rewrite
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Source directory {path} does not exist")]
    SourceMissing { path: PathBuf },

    #[error("No AS directories found in {path}")]
    NoNodes { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML {path}: {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize TOML {path}: {source}")]
    TomlWrite {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Failed to process JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
