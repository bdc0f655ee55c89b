//! The authoritative in-memory pack cache.
//!
//! [`CacheStore`] owns the ordered collection of packs (unique by id,
//! newest-known-first) and applies synchronization from fresh scan
//! batches under one of two reconciliation modes:
//!
//! - **Incremental**: cached packs absent from the fresh batch are evicted
//!   (the scan window is assumed a superset of all live packs - a known,
//!   accepted trade-off when the window is too shallow), and fresh packs
//!   not yet cached are inserted at the front.
//! - **Full**: the cached sequence is replaced wholesale.
//!
//! Concurrency discipline: exactly one synchronization may run at a time.
//! A second request while one is in flight is rejected with
//! [`SyncError::Busy`], never queued. Readers clone a snapshot under a
//! short read lock and never observe a partially spliced sequence. The
//! manual-cover map has its own lock and may mutate during a sync.

use crate::config::ResolvedConfig;
use crate::covers::{self, CoverTable, ManualCovers};
use crate::filter;
use crate::model::{Pack, PackId, PackView, StoreError, SyncError};
use crate::parser;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::{debug, info};

/// Reconciliation mode for one synchronization round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Reconcile against the observed window: evict cached packs missing
    /// from the batch, prepend new ones.
    Incremental,
    /// Discard the cache and adopt the batch verbatim.
    Full,
}

impl ScanMode {
    /// Select the mode for a requested scan depth: shallow scans sync
    /// incrementally, deep scans replace.
    pub fn for_depth(depth: usize, threshold: usize) -> Self {
        if depth <= threshold {
            ScanMode::Incremental
        } else {
            ScanMode::Full
        }
    }
}

/// Counters from one synchronization round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Raw messages received from the scan.
    pub scanned: usize,
    /// Messages the parser rejected.
    pub rejected: usize,
    /// Valid packs dropped as in-batch duplicates (by id or fingerprint).
    pub duplicates: usize,
    /// Cached packs evicted by reconciliation.
    pub removed: usize,
    /// Fresh packs added to the cache.
    pub added: usize,
    /// Cache size after reconciliation.
    pub total: usize,
}

/// Point-in-time store counters for status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    /// Packs currently cached.
    pub cached_packs: usize,
    /// Time of the last successful reconciliation.
    pub last_sync: Option<DateTime<Utc>>,
}

/// Process-lifetime cache of parsed packs plus cover state.
#[derive(Debug)]
pub struct CacheStore {
    price_multiplier: u64,
    best_sellers: Vec<String>,
    covers: CoverTable,
    packs: RwLock<Vec<Pack>>,
    last_sync: RwLock<Option<DateTime<Utc>>>,
    manual_covers: RwLock<ManualCovers>,
    sync_in_progress: AtomicBool,
}

impl CacheStore {
    pub fn new(config: &ResolvedConfig, covers: CoverTable, manual_covers: ManualCovers) -> Self {
        Self {
            price_multiplier: config.price_multiplier,
            best_sellers: config.best_sellers.clone(),
            covers,
            packs: RwLock::new(Vec::new()),
            last_sync: RwLock::new(None),
            manual_covers: RwLock::new(manual_covers),
            sync_in_progress: AtomicBool::new(false),
        }
    }

    /// Parse a batch of raw messages and reconcile the cache.
    ///
    /// `raw_messages` must be ordered newest-first, as delivered by the
    /// message source after its own traversal. Returns [`SyncError::Busy`]
    /// without touching any state if a synchronization is already running.
    pub fn ingest(&self, raw_messages: &[String], mode: ScanMode) -> Result<SyncReport, SyncError> {
        if self
            .sync_in_progress
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(SyncError::Busy);
        }
        let report = self.reconcile(raw_messages, mode);
        self.sync_in_progress.store(false, Ordering::Release);
        Ok(report)
    }

    fn reconcile(&self, raw_messages: &[String], mode: ScanMode) -> SyncReport {
        let mut fresh = Vec::new();
        let mut rejected = 0usize;
        for raw in raw_messages {
            match parser::parse(raw, self.price_multiplier) {
                Ok(pack) => fresh.push(pack),
                Err(rejection) => {
                    rejected += 1;
                    debug!(%rejection, "discarding message");
                }
            }
        }

        let parsed = fresh.len();
        let fresh = dedup_batch(fresh);
        let duplicates = parsed - fresh.len();

        let (removed, added, total) = match mode {
            ScanMode::Incremental => {
                let fresh_ids: HashSet<PackId> = fresh.iter().map(|p| p.id().clone()).collect();
                let mut packs = self.packs.write().expect("packs lock poisoned");

                // Evict everything the scan window no longer shows.
                let before = packs.len();
                packs.retain(|p| fresh_ids.contains(p.id()));
                let removed = before - packs.len();

                // Prepend packs not already cached, newest-first.
                let cached_ids: HashSet<PackId> = packs.iter().map(|p| p.id().clone()).collect();
                let mut added = 0usize;
                for pack in fresh {
                    if !cached_ids.contains(pack.id()) {
                        packs.insert(0, pack);
                        added += 1;
                    }
                }
                (removed, added, packs.len())
            }
            ScanMode::Full => {
                let mut packs = self.packs.write().expect("packs lock poisoned");
                let removed = packs.len();
                *packs = fresh;
                (removed, packs.len(), packs.len())
            }
        };

        *self.last_sync.write().expect("last_sync lock poisoned") = Some(Utc::now());

        let report = SyncReport {
            scanned: raw_messages.len(),
            rejected,
            duplicates,
            removed,
            added,
            total,
        };
        info!(
            ?mode,
            scanned = report.scanned,
            rejected = report.rejected,
            duplicates = report.duplicates,
            removed = report.removed,
            added = report.added,
            total = report.total,
            "cache reconciled"
        );
        report
    }

    /// Clone the current pack sequence. Readers work on the snapshot and
    /// never hold the lock across filtering.
    pub fn snapshot(&self) -> Vec<Pack> {
        self.packs.read().expect("packs lock poisoned").clone()
    }

    /// Run the keyword filter over the current snapshot and render views.
    pub fn search(&self, query: &str, exclude: &str, limit: usize) -> Vec<PackView> {
        let snapshot = self.snapshot();
        let manual = self
            .manual_covers
            .read()
            .expect("manual covers lock poisoned")
            .clone();

        let results: Vec<PackView> = snapshot
            .iter()
            .filter(|pack| filter::matches(pack, query, exclude))
            .take(limit)
            .map(|pack| {
                let cover = covers::resolve_cover(pack, &manual, &self.covers).map(str::to_string);
                pack.to_view(cover, &self.best_sellers)
            })
            .collect();

        debug!(
            query,
            exclude,
            limit,
            hits = results.len(),
            of = snapshot.len(),
            "search"
        );
        results
    }

    /// Remove one pack by id. `NotFound` leaves the cache unchanged.
    pub fn delete(&self, id: &PackId) -> Result<(), StoreError> {
        let mut packs = self.packs.write().expect("packs lock poisoned");
        let before = packs.len();
        packs.retain(|p| p.id() != id);
        if packs.len() == before {
            return Err(StoreError::NotFound(id.clone()));
        }
        info!(%id, "pack deleted from cache");
        Ok(())
    }

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            cached_packs: self.packs.read().expect("packs lock poisoned").len(),
            last_sync: *self.last_sync.read().expect("last_sync lock poisoned"),
        }
    }

    /// Set or clear one manual cover override. `None` removes it.
    pub fn set_manual_cover(&self, id: PackId, url: Option<String>) {
        let mut manual = self
            .manual_covers
            .write()
            .expect("manual covers lock poisoned");
        match &url {
            Some(_) => info!(%id, "manual cover set"),
            None => info!(%id, "manual cover removed"),
        }
        manual.set(id, url);
    }

    /// Apply a batch of manual cover overrides. Returns the number of
    /// entries applied.
    pub fn bulk_set_manual_covers(&self, entries: Vec<(PackId, Option<String>)>) -> usize {
        let mut manual = self
            .manual_covers
            .write()
            .expect("manual covers lock poisoned");
        let applied = entries.len();
        for (id, url) in entries {
            manual.set(id, url);
        }
        info!(applied, "manual covers bulk updated");
        applied
    }

    /// Replace the manual cover map wholesale, e.g. after the persistence
    /// file was rewritten externally.
    pub fn reload_manual_covers(&self, fresh: ManualCovers) {
        let mut manual = self
            .manual_covers
            .write()
            .expect("manual covers lock poisoned");
        info!(entries = fresh.len(), "manual covers reloaded");
        *manual = fresh;
    }
}

/// Drop in-batch duplicates by id or content fingerprint.
///
/// The batch is newest-first, so the first-seen (newest) instance of a
/// repost wins and the older one is discarded.
fn dedup_batch(packs: Vec<Pack>) -> Vec<Pack> {
    let mut seen_ids: HashSet<PackId> = HashSet::with_capacity(packs.len());
    let mut seen_fingerprints = HashSet::with_capacity(packs.len());
    let mut kept = Vec::with_capacity(packs.len());

    for pack in packs {
        let fingerprint = pack.fingerprint();
        if seen_ids.contains(pack.id()) || seen_fingerprints.contains(&fingerprint) {
            continue;
        }
        seen_ids.insert(pack.id().clone());
        seen_fingerprints.insert(fingerprint);
        kept.push(pack);
    }
    kept
}
