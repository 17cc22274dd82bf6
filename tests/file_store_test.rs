//! Integration test: player records on disk
//!
//! Creates, saves and reloads players through a real `FileStore`.

use moondust::persistence::{FileStore, PlayerStore, StoreError};
use moondust::Track;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique scratch directory per test.
fn scratch_dir() -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("moondust-store-{}-{}", std::process::id(), id));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_create_then_find_by_token() {
    let dir = scratch_dir();
    let store = FileStore::open(&dir).unwrap();

    let record = store.create("  Ana  ").unwrap();
    assert_eq!(record.nickname, "Ana");
    assert_eq!(record.state.currency, 0);

    let found = store.find_by_token(&record.token).unwrap().unwrap();
    assert_eq!(found, record);
    assert!(store.find_by_token("missing").unwrap().is_none());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_saves_survive_reopen() {
    let dir = scratch_dir();
    let mut record = {
        let store = FileStore::open(&dir).unwrap();
        store.create("Bia").unwrap()
    };

    record.state.currency = 340_282_366_920_938_463_463_374_607_431_768_211_455;
    record.state.fractional_carry = 0.37;
    record.state.levels.set(Track::Engines, 6);
    record.state.prestige_multipliers.set(Track::Probe, 1.5);
    record.state.prestige_points = 3;
    record.last_save_time = 1_700_000_000;

    {
        let store = FileStore::open(&dir).unwrap();
        store.save(&record).unwrap();
    }

    let store = FileStore::open(&dir).unwrap();
    let loaded = store.find_by_token(&record.token).unwrap().unwrap();
    assert_eq!(loaded, record);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_tampered_save_is_rejected() {
    let dir = scratch_dir();
    let store = FileStore::open(&dir).unwrap();
    let record = store.create("Caio").unwrap();

    let path = dir.join("players").join(format!("{}.dat", record.id));
    let mut bytes = fs::read(&path).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xFF;
    fs::write(&path, bytes).unwrap();

    assert!(matches!(
        store.find_by_token(&record.token),
        Err(StoreError::ChecksumMismatch)
    ));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_invalid_nicknames_are_refused() {
    let dir = scratch_dir();
    let store = FileStore::open(&dir).unwrap();

    assert!(matches!(store.create(""), Err(StoreError::InvalidNickname)));
    assert!(matches!(
        store.create(&"z".repeat(33)),
        Err(StoreError::InvalidNickname)
    ));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_tokens_are_unique_per_player() {
    let dir = scratch_dir();
    let store = FileStore::open(&dir).unwrap();

    let a = store.create("Ana").unwrap();
    let b = store.create("Ana").unwrap();
    assert_ne!(a.id, b.id);
    assert_ne!(a.token, b.token);
    assert_eq!(store.find_by_token(&b.token).unwrap().unwrap().id, b.id);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_concurrent_saves_of_one_player_all_succeed() {
    let dir = scratch_dir();
    let store = FileStore::open(&dir).unwrap();
    let record = store.create("Dani").unwrap();

    std::thread::scope(|scope| {
        for worker in 0..4_u128 {
            let store = &store;
            let mut record = record.clone();
            scope.spawn(move || {
                for i in 0..200 {
                    record.state.currency = worker * 1000 + i;
                    store.save(&record).unwrap();
                }
            });
        }
    });

    let loaded = store.find_by_token(&record.token).unwrap().unwrap();
    assert_eq!(loaded.state.currency % 1000, 199);
    let leftovers = fs::read_dir(dir.join("players"))
        .unwrap()
        .filter(|entry| entry.as_ref().unwrap().path().extension().unwrap() != "dat")
        .count();
    assert_eq!(leftovers, 0);

    fs::remove_dir_all(&dir).unwrap();
}
