//! The [`StateStore`] trait.
//!
//! A state store is a best-effort, single-slot cache of the latest commit
//! version. It lets readers skip a full log listing, but it is never the
//! source of truth: only a successful `rename_if_not_exists` on the log
//! itself proves a version is committed. An entry may lag, or be wrong after
//! a crash, and must be corroborated against the object store before being
//! trusted.

use crate::error::Result;
use crate::state::CommitState;

/// Storage backend for the cached commit state.
///
/// Implementations must be thread-safe. A lock or coordination service can
/// back this trait just as well as a file; nothing here ties it to the
/// object store.
pub trait StateStore: Send + Sync {
    /// Read the recorded state.
    ///
    /// Fails with `StateIsEmpty` if nothing was ever recorded, which callers
    /// must treat as "scan the log", not as corruption. Fails with
    /// `CanNotReadState` if the medium is unreadable.
    fn get(&self) -> Result<CommitState>;

    /// Record a new state, unconditionally.
    ///
    /// Fails with `CanNotWriteState` if the medium rejects it.
    fn put(&self, state: CommitState) -> Result<()>;
}
