//! A minimal committer/reader pair on top of both stores: the state cache is
//! only written after a slot is won, and readers corroborate it against the
//! log before trusting it.

use tempfile::TempDir;
use txlog_state::{CommitState, FileStateStore, InMemoryStateStore, StateStore};
use txlog_storage::{FileObjectStore, ObjectStore, Path};

fn slot(version: i64) -> Path {
    Path::new(format!("_log/{version:020}.json"))
}

/// Claim the next free slot at or after `start`, retrying on conflict.
fn commit(store: &dyn ObjectStore, state: &dyn StateStore, start: i64, body: &[u8]) -> i64 {
    let staging = Path::new(format!("_log/_staging/{start}"));
    store.put(&staging, body).unwrap();
    let mut version = start;
    loop {
        match store.rename_if_not_exists(&staging, &slot(version)) {
            Ok(()) => break,
            Err(e) if e.is_version_conflict() => version += 1,
            Err(e) => panic!("claim failed: {e}"),
        }
    }
    state.put(CommitState::new(version)).unwrap();
    version
}

fn latest_from_listing(store: &dyn ObjectStore) -> Option<i64> {
    store
        .list(&Path::new("_log/"))
        .unwrap()
        .iter()
        .filter(|m| !m.is_dir())
        .filter_map(|m| m.location.filename()?.strip_suffix(".json")?.parse().ok())
        .max()
}

/// Start from the cached version if there is one, then walk forward while
/// the next slot exists.
fn latest_version(store: &dyn ObjectStore, state: &dyn StateStore) -> Option<i64> {
    let mut version = match state.get() {
        Ok(cached) => cached.version,
        Err(e) if e.is_empty() => return latest_from_listing(store),
        Err(e) => panic!("state unreadable: {e}"),
    };
    while store.exists(&slot(version + 1)).unwrap() {
        version += 1;
    }
    Some(version)
}

#[test]
fn empty_state_falls_back_to_listing() {
    let dir = TempDir::new().unwrap();
    let store = FileObjectStore::new(dir.path().join("table"));
    let state = InMemoryStateStore::new();

    assert_eq!(latest_version(&store, &state), None);
    store.put(&slot(0), b"a").unwrap();
    store.put(&slot(1), b"b").unwrap();
    assert_eq!(latest_version(&store, &state), Some(1));
}

#[test]
fn committer_updates_state_after_winning() {
    let dir = TempDir::new().unwrap();
    let store = FileObjectStore::new(dir.path().join("table"));
    let state = FileStateStore::new(dir.path().join("state.json"));

    assert_eq!(commit(&store, &state, 0, b"first"), 0);
    assert_eq!(commit(&store, &state, 0, b"second"), 1);
    assert_eq!(state.get().unwrap(), CommitState::new(1));
    assert_eq!(store.get(&slot(1)).unwrap().as_ref(), b"second");
}

#[test]
fn stale_state_is_corroborated_against_the_log() {
    let dir = TempDir::new().unwrap();
    let store = FileObjectStore::new(dir.path().join("table"));
    let state = InMemoryStateStore::new();

    commit(&store, &state, 0, b"v0");
    // Another writer commits without touching this cache.
    store.put(&slot(1), b"v1").unwrap();
    store.put(&slot(2), b"v2").unwrap();

    assert_eq!(state.get().unwrap().version, 0);
    assert_eq!(latest_version(&store, &state), Some(2));
}
