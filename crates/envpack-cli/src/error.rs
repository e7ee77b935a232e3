//! CLI error types with exit code handling
//!
//! Wraps core failures into diagnostics grouped the way operators think about
//! them: bad invocation, failed unpack, failed reconciliation.

use envpack_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Bad arguments, caught before the environment is touched
    #[error("{message}")]
    #[diagnostic(code(envpack::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The tarball could not be unpacked or was missing its release marker
    #[error("{0}")]
    #[diagnostic(code(envpack::cli::unpack))]
    Unpack(#[source] CoreError),

    /// Template extraction, status or diff failed
    #[error("{0}")]
    #[diagnostic(code(envpack::cli::reconcile))]
    Reconcile(#[source] CoreError),

    #[error("{message}")]
    #[diagnostic(code(envpack::cli::config))]
    Config { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. }
            | CliError::Unpack(_)
            | CliError::Reconcile(_)
            | CliError::Config { .. } => exit_codes::ERROR,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidEnvironmentName { .. } => CliError::Usage {
                message: err.to_string(),
                help: Some("pass the bare environment name, e.g. `--env prod`".to_string()),
            },
            CoreError::EnvironmentNotFound { .. } | CoreError::ManifestUnreadable { .. } => {
                CliError::Usage {
                    message: err.to_string(),
                    help: None,
                }
            }
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Extraction { .. }
            | CoreError::TableOfContents { .. }
            | CoreError::UnsupportedCompression { .. }
            | CoreError::MissingReleaseMarker { .. } => CliError::Unpack(err),
            other => CliError::Reconcile(other),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
