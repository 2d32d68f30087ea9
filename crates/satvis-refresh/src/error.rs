//! Refresh error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("refresh interval must be greater than zero")]
    InvalidInterval,

    /// The batch could not be issued (malformed descriptor).
    #[error("batch failed: {0}")]
    BatchFailed(String),

    /// Every request in the batch failed; nothing worth caching.
    #[error("all requests failed: {0}")]
    AllRequestsFailed(String),

    #[error("batch returned {actual} results, expected {expected}")]
    MisalignedBatch { expected: usize, actual: usize },

    /// The result arrived after the timer was stopped or the controller shut down.
    #[error("refresh result discarded")]
    Discarded,

    #[error("refresh controller is shut down")]
    ShutDown,
}

pub type RefreshResult<T> = Result<T, RefreshError>;
