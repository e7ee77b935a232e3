//! Core error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    // ============ Usage Errors ============
    #[error("The environment name must not include a slash character: {name}")]
    InvalidEnvironmentName { name: String },

    #[error("Environment {} does not exist.", path.display())]
    EnvironmentNotFound { path: PathBuf },

    #[error("Unable to read manifest {}.", path.display())]
    ManifestUnreadable { path: PathBuf },

    // ============ Unpack Errors ============
    #[error("Unable to untar {}: {message}", archive.display())]
    Extraction { archive: PathBuf, message: String },

    #[error("Unable to extract table of contents from {}: {message}", archive.display())]
    TableOfContents { archive: PathBuf, message: String },

    #[error("Unsupported {format} compression in {}", archive.display())]
    UnsupportedCompression { archive: PathBuf, format: &'static str },

    #[error("Did not find {} after untar.", path.display())]
    MissingReleaseMarker { path: PathBuf },

    // ============ Command Errors ============
    #[error("Command `{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Failed to run `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No diff available for {}", path.display())]
    DiffUnavailable { path: PathBuf },

    // ============ Manifest Errors ============
    #[error("Failed to parse {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid resource in {}: {message}", path.display())]
    InvalidResource { path: PathBuf, message: String },

    // ============ Configuration Errors ============
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Failed to serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// True for errors raised before any environment state is touched
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidEnvironmentName { .. }
                | CoreError::EnvironmentNotFound { .. }
                | CoreError::ManifestUnreadable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
