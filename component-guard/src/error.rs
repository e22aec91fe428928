//! Error types for the component guard crate.
//!
//! Validators never return these: problems with component content are
//! recorded as findings. `GuardError` covers the operational edges around
//! validation (registry persistence, discovery, configuration).

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the operational parts of the crate.
pub type GuardResult<T> = Result<T, GuardError>;

/// Main error type for component guard operations.
#[derive(Debug, Error)]
pub enum GuardError {
    /// IO error while reading components or registry files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Git repository access error.
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Configuration could not be assembled.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The hash registry could not be read or written.
    #[error("Hash registry '{}' error: {message}", path.display())]
    Registry {
        /// Location of the registry file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A component could not be loaded.
    #[error("Component '{}' error: {message}", path.display())]
    Component {
        /// The component path.
        path: PathBuf,
        /// The error message.
        message: String,
    },

    /// Unknown component type name.
    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),
}

impl From<figment::Error> for GuardError {
    fn from(err: figment::Error) -> Self {
        GuardError::Config(Box::new(err))
    }
}

impl GuardError {
    /// Build a registry error for the given file.
    pub fn registry(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        GuardError::Registry {
            path: path.into(),
            message: message.into(),
        }
    }
}
