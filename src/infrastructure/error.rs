//! Infrastructure-level errors (backend clients, TLS material)

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Backend;

/// Infrastructure errors carry the failure text of the backend client.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Key not found in store: {0}")]
    KeyNotFound(String),

    #[error("cannot connect to {backend}: {message}")]
    Connect { backend: Backend, message: String },

    #[error("{backend}: {message}")]
    Backend { backend: Backend, message: String },

    #[error("cannot read TLS file {path}: {source}")]
    TlsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TLS material in {path}: {message}")]
    TlsMaterial { path: PathBuf, message: String },
}

impl InfraError {
    /// Create a connection error from any client error.
    pub fn connect(backend: Backend, err: impl std::fmt::Display) -> Self {
        Self::Connect {
            backend,
            message: err.to_string(),
        }
    }

    /// Create a request error from any client error.
    pub fn backend(backend: Backend, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            backend,
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound(_))
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
