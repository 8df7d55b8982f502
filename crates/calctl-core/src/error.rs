//! Error types for calctl-core operations.

use thiserror::Error;

use crate::conflict::Conflict;

#[derive(Error, Debug)]
pub enum CalError {
    /// Malformed or out-of-range caller input. Always raised before any write.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    /// Every collision found, not only the first one.
    #[error("{} conflicting event(s) found", .0.len())]
    Conflict(Vec<Conflict>),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl CalError {
    /// Process exit code the command-line layer reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CalError::Storage(_) => 1,
            CalError::InvalidInput(_) => 2,
            CalError::NotFound(_) => 3,
            CalError::Conflict(_) => 4,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        CalError::InvalidInput(message.into())
    }
}

impl From<std::io::Error> for CalError {
    fn from(err: std::io::Error) -> Self {
        CalError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CalError {
    fn from(err: serde_json::Error) -> Self {
        CalError::Storage(format!("malformed event store: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, CalError>;
