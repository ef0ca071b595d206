//! Catalog concurrency integration tests.
//!
//! These tests hammer one file-backed store from many threads and check that
//! per-entry counters and flags never lose an update.

use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use cinelinks_core::{
    testing::fixtures, CatalogFilter, CatalogStore, EntryFlag, SqliteCatalog,
};

/// Test helper owning a file-backed catalog.
struct TestHarness {
    catalog: Arc<SqliteCatalog>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("catalog.db");
        let catalog = Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create catalog"));

        Self {
            catalog,
            _temp_dir: temp_dir,
        }
    }
}

#[test]
fn test_concurrent_downloads_never_lose_updates() {
    const THREADS: usize = 16;
    const PER_THREAD: usize = 25;

    let harness = TestHarness::new();
    let entry = harness
        .catalog
        .create(fixtures::new_movie("Crowded"))
        .unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let catalog = Arc::clone(&harness.catalog);
            let id = entry.id.clone();
            thread::spawn(move || {
                for _ in 0..PER_THREAD {
                    catalog.record_download(&id).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stored = harness.catalog.get(&entry.id).unwrap();
    assert_eq!(stored.download_count, (THREADS * PER_THREAD) as u64);
    assert_eq!(
        harness.catalog.stats().unwrap().total_downloads,
        (THREADS * PER_THREAD) as u64
    );
}

#[test]
fn test_returned_counts_are_unique() {
    const THREADS: usize = 8;

    let harness = TestHarness::new();
    let entry = harness.catalog.create(fixtures::new_movie("Race")).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let catalog = Arc::clone(&harness.catalog);
            let id = entry.id.clone();
            thread::spawn(move || catalog.record_download(&id).unwrap())
        })
        .collect();

    let mut counts: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    counts.sort_unstable();
    assert_eq!(counts, (1..=THREADS as u64).collect::<Vec<_>>());
}

#[test]
fn test_even_number_of_concurrent_toggles_restores_flag() {
    const THREADS: usize = 10;

    let harness = TestHarness::new();
    let entry = harness.catalog.create(fixtures::new_movie("Flip")).unwrap();
    assert!(!entry.is_trending);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let catalog = Arc::clone(&harness.catalog);
            let id = entry.id.clone();
            thread::spawn(move || {
                catalog.toggle(&id, EntryFlag::Trending).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(!harness.catalog.get(&entry.id).unwrap().is_trending);
}

#[test]
fn test_concurrent_creates_are_all_listed() {
    const THREADS: usize = 8;

    let harness = TestHarness::new();
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let catalog = Arc::clone(&harness.catalog);
            thread::spawn(move || {
                catalog
                    .create(fixtures::new_movie(&format!("Parallel {}", i)))
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let page = harness.catalog.list(&CatalogFilter::new()).unwrap();
    assert_eq!(page.total, THREADS as u64);
    assert_eq!(page.items.len(), THREADS);
}
