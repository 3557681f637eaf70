//! In-memory state store for testing and ephemeral use.

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::{Result, StateError};
use crate::state::CommitState;
use crate::traits::StateStore;

/// An in-memory implementation of [`StateStore`].
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: RwLock<Option<CommitState>>,
}

impl InMemoryStateStore {
    /// Create an empty state store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self) -> Result<CommitState> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        (*state).ok_or(StateError::StateIsEmpty)
    }

    fn put(&self, state: CommitState) -> Result<()> {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(state);
        debug!(version = state.version, "recorded commit state");
        Ok(())
    }
}
