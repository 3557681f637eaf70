//! Behaviour every backend must share, exercised through `dyn ObjectStore`.

use std::sync::{Arc, Barrier};
use std::thread;

use proptest::prelude::*;
use tempfile::TempDir;
use txlog_storage::{
    open_object_store, ObjectStore, Path, RenameStrategy, StorageError, StoreConfig,
};

fn backends(dir: &TempDir) -> Vec<(String, Arc<dyn ObjectStore>)> {
    let configs = [
        StoreConfig::Local {
            root: dir.path().join("hard-link"),
            rename_strategy: RenameStrategy::HardLink,
        },
        StoreConfig::Local {
            root: dir.path().join("check-then-rename"),
            rename_strategy: RenameStrategy::CheckThenRename,
        },
        StoreConfig::Memory,
    ];
    configs
        .into_iter()
        .map(|c| (format!("{c:?}"), open_object_store(&c).unwrap()))
        .collect()
}

fn sorted_locations(store: &dyn ObjectStore, prefix: &str) -> Vec<String> {
    let mut locs: Vec<String> = store
        .list(&Path::new(prefix))
        .unwrap()
        .into_iter()
        .map(|m| m.location.to_string())
        .collect();
    locs.sort();
    locs
}

#[test]
fn head_on_missing_object_is_repeatable() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        for _ in 0..3 {
            let err = store.head(&Path::new("_log/00000.json")).unwrap_err();
            assert!(err.is_not_found(), "{name}: {err}");
        }
    }
}

#[test]
fn failed_claim_leaves_staging_intact() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        let slot = Path::new("_log/00000.json");
        store.put(&slot, b"first").unwrap();
        store.put(&Path::new("_log/_staging/a"), b"second").unwrap();

        let err = store
            .rename_if_not_exists(&Path::new("_log/_staging/a"), &slot)
            .unwrap_err();
        assert!(
            matches!(err, StorageError::VersionAlreadyExists { .. }),
            "{name}: {err}"
        );
        assert_eq!(
            store.get(&Path::new("_log/_staging/a")).unwrap().as_ref(),
            b"second"
        );
        assert_eq!(store.get(&slot).unwrap().as_ref(), b"first");
    }
}

#[test]
fn directory_listing_convention() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        store.put(&Path::new("a/x"), b"x").unwrap();
        store.put(&Path::new("a/b/y"), b"yy").unwrap();

        let listed = store.list(&Path::new("a/")).unwrap();
        let locs = sorted_locations(store.as_ref(), "a/");
        assert_eq!(locs, vec!["a/", "a/b/", "a/b/y", "a/x"], "{name}");
        for meta in listed.iter().filter(|m| m.is_dir()) {
            assert_eq!(meta.size, 0, "{name}");
        }
        assert!(store.list(&Path::new("z/")).unwrap().is_empty(), "{name}");
    }
}

#[test]
fn prefix_filters_top_level_names() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        for file in ["abc.txt", "abd.txt", "xyz.txt"] {
            store.put(&Path::new("t").child(file), b"x").unwrap();
        }
        assert_eq!(
            sorted_locations(store.as_ref(), "t/ab"),
            vec!["t/abc.txt", "t/abd.txt"],
            "{name}"
        );
    }
}

#[test]
fn missing_below_a_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        store.put(&Path::new("a"), b"leaf").unwrap();
        let below = Path::new("a/x");
        assert!(store.head(&below).unwrap_err().is_not_found(), "{name}");
        assert!(store.get(&below).unwrap_err().is_not_found(), "{name}");
        assert!(!store.exists(&below).unwrap(), "{name}");
    }
}

#[test]
fn store_root_is_not_an_object() {
    let dir = TempDir::new().unwrap();
    for (name, store) in backends(&dir) {
        store.put(&Path::new("a"), b"leaf").unwrap();
        let root = Path::default();
        assert!(
            matches!(store.head(&root), Err(StorageError::InvalidPath { .. })),
            "{name}"
        );
        assert!(
            matches!(store.get(&root), Err(StorageError::InvalidPath { .. })),
            "{name}"
        );
    }
}

/// Many writers race for the same slot; exactly one wins and the slot holds
/// that writer's content.
#[test]
fn concurrent_claims_have_one_winner() {
    const WRITERS: usize = 8;

    let dir = TempDir::new().unwrap();
    let stores = vec![
        open_object_store(&StoreConfig::local(dir.path().join("local"))).unwrap(),
        open_object_store(&StoreConfig::Memory).unwrap(),
    ];

    for store in stores {
        for round in 0..10 {
            let slot = Path::new(format!("_log/{round:020}.json"));
            let barrier = Arc::new(Barrier::new(WRITERS));

            let handles: Vec<_> = (0..WRITERS)
                .map(|writer| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    let slot = slot.clone();
                    thread::spawn(move || {
                        let staging = Path::new(format!("_log/_staging/{round}-{writer}"));
                        let content = format!("writer-{writer}");
                        store.put(&staging, content.as_bytes()).unwrap();
                        barrier.wait();
                        match store.rename_if_not_exists(&staging, &slot) {
                            Ok(()) => Some(content),
                            Err(e) if e.is_version_conflict() => None,
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    })
                })
                .collect();

            let winners: Vec<String> = handles
                .into_iter()
                .filter_map(|h| h.join().unwrap())
                .collect();
            assert_eq!(winners.len(), 1, "round {round}: {winners:?}");
            assert_eq!(store.get(&slot).unwrap().as_ref(), winners[0].as_bytes());
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn put_then_get_round_trips(
        name in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
        data in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let dir = TempDir::new().unwrap();
        for (_, store) in backends(&dir) {
            let loc = Path::new(&name);
            store.put(&loc, &data).unwrap();
            let got = store.get(&loc).unwrap();
            prop_assert_eq!(got.as_ref(), data.as_slice());
            prop_assert_eq!(store.head(&loc).unwrap().size, data.len() as u64);
        }
    }
}
