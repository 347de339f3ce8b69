//! CLI-level errors (wrap application errors with the failing command)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Connect(ApplicationError),

    #[error("{0}")]
    Put(ApplicationError),

    #[error("{0}")]
    Get(ApplicationError),

    #[error("{0}")]
    Delete(ApplicationError),

    #[error("key is already set")]
    KeyAlreadySet,

    #[error("{0}")]
    Cas(ApplicationError),

    #[error("false")]
    KeyAbsent,

    #[error("{0}")]
    DeleteTree(ApplicationError),

    #[error("Please specify subtree. To delete all, use /.")]
    MissingSubtree,

    #[error("{0}")]
    List(ApplicationError),

    #[error("cannot write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Connect(_) => exitcode::CONNECTION,
            CliError::Put(_) => exitcode::PUT,
            CliError::Get(_) => exitcode::GET,
            CliError::Delete(_) => exitcode::DELETE,
            CliError::KeyAlreadySet => exitcode::KEY_EXISTS,
            CliError::Cas(_) => exitcode::CAS,
            CliError::KeyAbsent => exitcode::KEY_ABSENT,
            CliError::DeleteTree(_) => exitcode::DELETE_TREE,
            CliError::MissingSubtree => exitcode::MISSING_SUBTREE,
            CliError::List(_) => exitcode::LIST,
            CliError::Output(_) => exitcode::IOERR,
        }
    }

    /// Fixed messages that scripts match on are printed without decoration.
    pub fn is_plain(&self) -> bool {
        matches!(
            self,
            CliError::KeyAlreadySet | CliError::KeyAbsent | CliError::MissingSubtree
        )
    }
}
