//! Error types for commit-state operations.

use thiserror::Error;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while reading or writing the commit state.
#[derive(Debug, Error)]
pub enum StateError {
    /// Nothing has been recorded yet. Fall back to listing the log.
    #[error("the state is empty")]
    StateIsEmpty,

    /// The backing medium is unreadable or holds something unparsable.
    #[error("the state could not be read")]
    CanNotReadState(#[source] Cause),

    /// The backing medium rejected the write.
    #[error("the state could not be written")]
    CanNotWriteState(#[source] Cause),

    /// State store configuration is unusable.
    #[error("invalid state store configuration: {0}")]
    Config(String),
}

impl StateError {
    /// Returns `true` for [`StateError::StateIsEmpty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::StateIsEmpty)
    }

    pub(crate) fn read(cause: impl Into<Cause>) -> Self {
        Self::CanNotReadState(cause.into())
    }

    pub(crate) fn write(cause: impl Into<Cause>) -> Self {
        Self::CanNotWriteState(cause.into())
    }
}

/// Convenience type alias for state operations.
pub type Result<T> = std::result::Result<T, StateError>;
