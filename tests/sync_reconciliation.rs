//! Acceptance tests for cache reconciliation through the public API.
//!
//! Covers the two sync modes, in-batch deduplication, delete outcomes,
//! and the single-writer discipline.

use packdex::config::ResolvedConfig;
use packdex::covers::{CoverTable, ManualCovers};
use packdex::model::{PackId, StoreError, SyncError};
use packdex::store::{CacheStore, ScanMode};
use std::sync::Arc;

fn store() -> CacheStore {
    CacheStore::new(
        &ResolvedConfig::default(),
        CoverTable::default(),
        ManualCovers::default(),
    )
}

fn message(id: &str, items: &[&str], price: u64) -> String {
    format!(
        "NINTENDO SWITCH ACCOUNT #{id}\nID : {id}\n{}\n{price}$\nFor buy: DM",
        items.join("\n")
    )
}

fn cached_ids(store: &CacheStore) -> Vec<String> {
    store
        .snapshot()
        .iter()
        .map(|p| p.id().as_str().to_string())
        .collect()
}

#[test]
fn incremental_sync_reconciles_against_the_window() {
    // cached = {P1,P2,P3}, fresh = {P2,P4} => cache == {P2,P4}
    let s = store();
    s.ingest(
        &[
            message("1", &["Game A"], 5),
            message("2", &["Game B"], 6),
            message("3", &["Game C"], 7),
        ],
        ScanMode::Full,
    )
    .expect("initial sync");

    let report = s
        .ingest(
            &[message("2", &["Game B"], 6), message("4", &["Game D"], 8)],
            ScanMode::Incremental,
        )
        .expect("incremental sync");

    assert_eq!(report.removed, 2);
    assert_eq!(report.added, 1);
    let mut ids = cached_ids(&s);
    ids.sort();
    assert_eq!(ids, vec!["2", "4"]);
}

#[test]
fn incremental_sync_evicts_everything_outside_the_window() {
    // Documented trade-off: a scan window shallower than the live set
    // evicts valid packs.
    let s = store();
    s.ingest(
        &[message("1", &["Game A"], 5), message("2", &["Game B"], 6)],
        ScanMode::Full,
    )
    .expect("initial sync");

    s.ingest(&[message("2", &["Game B"], 6)], ScanMode::Incremental)
        .expect("narrow window sync");
    assert_eq!(cached_ids(&s), vec!["2"]);
}

#[test]
fn full_sync_replaces_the_cache_exactly() {
    let s = store();
    s.ingest(
        &[message("1", &["Game A"], 5), message("2", &["Game B"], 6)],
        ScanMode::Full,
    )
    .expect("initial sync");

    s.ingest(&[message("3", &["Game C"], 7)], ScanMode::Full)
        .expect("full sync");
    assert_eq!(cached_ids(&s), vec!["3"]);
}

#[test]
fn repost_of_same_bundle_dedups_across_ids() {
    let s = store();
    let report = s
        .ingest(
            &[
                message("10", &["Mario Kart 8", "Zelda"], 9),
                // Older repost of the same bundle, different id and price.
                message("3", &["zelda", "MARIO KART 8"], 4),
            ],
            ScanMode::Full,
        )
        .expect("sync");
    assert_eq!(report.duplicates, 1);
    assert_eq!(cached_ids(&s), vec!["10"], "Newest instance wins");
}

#[test]
fn invalid_messages_are_skipped_without_failing_the_sync() {
    let s = store();
    let report = s
        .ingest(
            &[
                "random chatter with no structure".to_string(),
                message("1", &["Kirby"], 5),
                "ID : 2\nonly an id, no price".to_string(),
            ],
            ScanMode::Full,
        )
        .expect("sync");
    assert_eq!(report.scanned, 3);
    assert_eq!(report.rejected, 2);
    assert_eq!(cached_ids(&s), vec!["1"]);
}

#[test]
fn delete_then_delete_again_reports_not_found() {
    let s = store();
    s.ingest(&[message("1", &["Kirby"], 5)], ScanMode::Full)
        .expect("sync");

    let id = PackId::new("1").expect("valid id");
    assert!(s.delete(&id).is_ok());
    assert_eq!(s.delete(&id), Err(StoreError::NotFound(id)));
    assert_eq!(s.status().cached_packs, 0);
}

#[test]
fn concurrent_readers_never_block_a_sync() {
    let s = Arc::new(store());
    s.ingest(&[message("1", &["Kirby"], 5)], ScanMode::Full)
        .expect("initial sync");

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let s = Arc::clone(&s);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let _ = s.search("kirby", "", 10);
                    let _ = s.status();
                }
            })
        })
        .collect();

    for _ in 0..50 {
        // Sequential syncs from this thread; Busy is impossible here, any
        // other error would be a bug.
        s.ingest(&[message("2", &["Metroid"], 6)], ScanMode::Incremental)
            .expect("sync with readers active");
    }
    for reader in readers {
        reader.join().expect("reader thread");
    }
    assert_eq!(cached_ids(&*s), vec!["2"]);
}

#[test]
fn concurrent_syncs_either_apply_or_report_busy() {
    let s = Arc::new(store());
    let writers: Vec<_> = (0..4)
        .map(|i| {
            let s = Arc::clone(&s);
            std::thread::spawn(move || {
                let batch = vec![message(&format!("{i}"), &["Game"], 5)];
                s.ingest(&batch, ScanMode::Incremental)
            })
        })
        .collect();

    let mut applied = 0;
    for writer in writers {
        match writer.join().expect("writer thread") {
            Ok(_) => applied += 1,
            Err(SyncError::Busy) => {}
        }
    }
    assert!(applied >= 1, "At least one sync must win the guard");
    assert_eq!(
        s.status().cached_packs,
        1,
        "Each incremental batch holds one pack, last winner's survives"
    );
}

#[test]
fn manual_cover_updates_do_not_conflict_with_syncs() {
    let s = Arc::new(store());
    let writer = {
        let s = Arc::clone(&s);
        std::thread::spawn(move || {
            for i in 0..100 {
                let _ = s.ingest(&[message("1", &["Kirby"], i + 1)], ScanMode::Full);
            }
        })
    };
    for i in 0..100 {
        s.set_manual_cover(
            PackId::new("1").expect("valid id"),
            Some(format!("https://img/{i}.jpg")),
        );
    }
    writer.join().expect("writer thread");
    assert_eq!(s.status().cached_packs, 1);
}
