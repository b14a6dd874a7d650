// Error taxonomy for the task store and its persistence backends

use thiserror::Error;

use crate::model::TaskStatus;

/// Everything the library can fail with. All errors surface
/// synchronously to the caller; nothing retries.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected input at task creation.
    #[error("invalid input: {0}")]
    Validation(String),

    /// No task with the given id.
    #[error("no task with id {0}")]
    NotFound(String),

    /// Status move that is not the immediate successor.
    #[error("cannot move task from {from} to {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Operation defined only for completed tasks.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Persisted document failed to parse.
    #[error("corrupt persisted state: {0}")]
    CorruptState(String),

    /// Key-value backend failure.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
