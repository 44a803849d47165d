//! Taskpulse error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskpulseError>;

#[derive(Debug, Error)]
pub enum TaskpulseError {
    /// Invalid configuration rejected at setup time.
    #[error("Config error: {0}")]
    Config(String),

    /// Persistence store read/write failure.
    #[error("Store error: {0}")]
    Store(String),

    /// Host task store could not be read.
    #[error("Task source error: {0}")]
    TaskSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
