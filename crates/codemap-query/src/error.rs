//! Typed error surface for the query engine, shared across its six
//! operations and the `reindex_project` mutator.

use thiserror::Error;

/// Stable machine-readable error code, independent of the human-readable
/// message carried alongside it in [`CodemapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    ParseFailed,
    Io,
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ParseFailed => "PARSE_FAILED",
            ErrorCode::Io => "IO_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, Error)]
pub enum CodemapError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("parse failed: {0}")]
    ParseFailed(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl CodemapError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CodemapError::InvalidInput(_) => ErrorCode::InvalidInput,
            CodemapError::NotFound(_) => ErrorCode::NotFound,
            CodemapError::ParseFailed(_) => ErrorCode::ParseFailed,
            CodemapError::Io(_) => ErrorCode::Io,
            CodemapError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<codemap_core::store::StoreError> for CodemapError {
    fn from(err: codemap_core::store::StoreError) -> Self {
        CodemapError::Internal(err.to_string())
    }
}

impl From<codemap_indexer::driver::DriverError> for CodemapError {
    fn from(err: codemap_indexer::driver::DriverError) -> Self {
        CodemapError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CodemapError>;
