use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use clipboard_whitelist_store::{
    FileSource, MemorySource, ReloadOutcome, SourceError, WhitelistStore,
};

#[test]
fn file_source_tracks_edits_between_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whitelist.json");
    let store = WhitelistStore::new(Arc::new(FileSource::new(&path)));

    store.reload();
    assert!(!store.is_enabled("com.a"));

    fs::write(&path, r#"{"com.a": true}"#).unwrap();
    store.reload();
    assert!(store.is_enabled("com.a"));

    fs::write(&path, "com.a: false\ncom.b: true\n").unwrap();
    store.reload();
    assert!(!store.is_enabled("com.a"));
    assert!(store.is_enabled("com.b"));
}

#[test]
fn corrupt_file_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whitelist.yaml");
    fs::write(&path, "entries:\n  - package: com.a\n    enabled: true\n").unwrap();
    let store = WhitelistStore::open(Arc::new(FileSource::new(&path)));
    assert!(store.is_enabled("com.a"));

    fs::write(&path, "{not valid").unwrap();
    let outcome = store.reload();

    assert!(matches!(
        outcome,
        ReloadOutcome::Retained {
            error: SourceError::Parse(_),
            ..
        }
    ));
    assert!(store.is_enabled("com.a"));
    assert!(!store.is_enabled("com.unknown"));
}

#[test]
fn directory_in_place_of_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = WhitelistStore::open(Arc::new(FileSource::new(dir.path())));
    assert!(matches!(store.last_error(), Some(SourceError::Io { .. })));
    assert!(!store.is_enabled("com.a"));
}

#[test]
fn concurrent_reloads_never_expose_partial_snapshots() {
    // Two alternating whitelists; a reader must always see one of them whole.
    let left: Vec<(String, bool)> = (0..64).map(|i| (format!("com.left.{i}"), true)).collect();
    let right: Vec<(String, bool)> = (0..64).map(|i| (format!("com.right.{i}"), true)).collect();

    let source = MemorySource::with_entries(left.clone());
    let store = Arc::new(WhitelistStore::open(Arc::new(source.clone())));
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let source = source.clone();
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            for round in 0..200 {
                if round % 2 == 0 {
                    source.replace_all(right.clone());
                } else {
                    source.replace_all(left.clone());
                }
            }
            stop.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut last_rev = 0;
                while !stop.load(Ordering::SeqCst) {
                    store.reload();
                    let snapshot = store.snapshot();
                    assert_eq!(snapshot.len(), 64);
                    let lefts = snapshot
                        .enabled_packages()
                        .iter()
                        .filter(|p| p.starts_with("com.left."))
                        .count();
                    assert!(lefts == 0 || lefts == 64);
                    assert!(snapshot.rev >= last_rev);
                    last_rev = snapshot.rev;
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
