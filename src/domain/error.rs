//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid invocations.
/// These are independent of any backend.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("unsupported kvstore: '{0}' (expected consul, etcd or zookeper)")]
    UnknownBackend(String),

    #[error("no kvstore selected, use --kvstore")]
    MissingBackend,

    #[error("no kvstore address given, use --client")]
    MissingAddress,

    #[error("Please specify subtree. To delete all, use /.")]
    EmptySubtree,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
