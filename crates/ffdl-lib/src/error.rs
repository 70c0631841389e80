use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FfdlError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation failed: {details}")]
    ConfigValidation { details: String },

    #[error("Invalid command-line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Failed to prepare cache directory {path}: {reason}")]
    StorageOpen { path: PathBuf, reason: String },

    #[error("Failed to load cache from {path}: {reason}")]
    StorageLoad { path: PathBuf, reason: String },

    #[error("Failed to save cache to {path}: {reason}")]
    StorageSave { path: PathBuf, reason: String },

    #[error("No fingerprint recorded for channel [{channel}]")]
    FingerprintNotFound { channel: String },

    #[error("Failed to write output file {path}: {source}")]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to download [{channel}] from {url}: {source}")]
    Network {
        channel: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
