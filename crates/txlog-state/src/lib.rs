//! Commit-state cache for the txlog transaction log.
//!
//! Readers that want the latest table version can either list the whole log
//! or ask a [`StateStore`] for the last recorded [`CommitState`]. The cache
//! is independent of the object store so a lock or coordination service can
//! back it in a distributed deployment.
//!
//! # Modules
//!
//! - [`error`] — [`StateError`] and the crate `Result`
//! - [`state`] — [`CommitState`]
//! - [`traits`] — the [`StateStore`] trait
//! - [`memory`] — [`InMemoryStateStore`] for tests
//! - [`file`] — [`FileStateStore`], a JSON file
//! - [`config`] — [`StateConfig`] and [`open_state_store`]

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod state;
pub mod traits;

pub use config::{open_state_store, StateConfig};
pub use error::{Result, StateError};
pub use file::FileStateStore;
pub use memory::InMemoryStateStore;
pub use state::{CommitState, Version};
pub use traits::StateStore;
