//! Cover image resolution.
//!
//! Maps a pack's item text to a display image URL. A manual-override table
//! keyed by pack id is consulted first; otherwise a keyword table is
//! scanned longest-key-first so a specific title ("mario odyssey") beats a
//! generic one ("mario") when both would match. No match resolves to
//! `None` - there is no default image.
//!
//! Both tables load from JSON files supplied by the persistence
//! collaborator. A corrupt or missing file degrades to an empty table with
//! a warning; it never aborts startup.

use crate::model::{Pack, PackId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Automatic keyword-to-URL cover table.
///
/// Entries are held lowercased and sorted by descending key length so
/// resolution is a first-match scan.
#[derive(Debug, Clone, Default)]
pub struct CoverTable {
    entries: Vec<(String, String)>,
}

/// On-disk shape of the cover table file. The legacy `default` key is
/// tolerated and ignored: resolution intentionally returns no fallback.
#[derive(Debug, Deserialize, Default)]
struct CoversFile {
    #[serde(default)]
    covers: HashMap<String, String>,
}

impl CoverTable {
    /// Build a table from a keyword-to-URL mapping.
    pub fn new(covers: HashMap<String, String>) -> Self {
        let mut entries: Vec<(String, String)> = covers
            .into_iter()
            .map(|(keyword, url)| (keyword.to_lowercase(), url))
            .collect();
        // Longest-first; ties broken lexicographically for determinism.
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    /// Load the table from a JSON file, degrading to empty on any failure.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(?path, %err, "cover table unavailable, continuing without covers");
                return Self::default();
            }
        };
        match serde_json::from_str::<CoversFile>(&raw) {
            Ok(file) => Self::new(file.covers),
            Err(err) => {
                warn!(?path, %err, "cover table corrupt, continuing without covers");
                Self::default()
            }
        }
    }

    /// Resolve the first keyword (longest first) found in the pack's item
    /// text.
    pub fn resolve(&self, pack: &Pack) -> Option<&str> {
        let haystack = pack.items_text_lower();
        self.entries
            .iter()
            .find(|(keyword, _)| haystack.contains(keyword.as_str()))
            .map(|(_, url)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Manual per-pack cover overrides. Always wins over [`CoverTable`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualCovers {
    map: HashMap<PackId, String>,
}

impl ManualCovers {
    /// Load overrides from a JSON file (`{"<id>": "<url>", ...}`).
    ///
    /// A corrupt or missing file degrades to an empty mapping. Entries
    /// whose key is not a valid pack id are skipped with a warning.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(?path, %err, "manual covers unavailable, starting empty");
                return Self::default();
            }
        };
        let parsed: HashMap<String, String> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(?path, %err, "manual covers corrupt, starting empty");
                return Self::default();
            }
        };

        let mut map = HashMap::with_capacity(parsed.len());
        for (key, url) in parsed {
            match PackId::new(key) {
                Ok(id) => {
                    map.insert(id, url);
                }
                Err(err) => warn!(%err, "skipping manual cover with invalid pack id"),
            }
        }
        Self { map }
    }

    pub fn get(&self, id: &PackId) -> Option<&str> {
        self.map.get(id).map(String::as_str)
    }

    /// Set or clear one override. `None` removes the entry.
    pub fn set(&mut self, id: PackId, url: Option<String>) {
        match url {
            Some(url) => {
                self.map.insert(id, url);
            }
            None => {
                self.map.remove(&id);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Resolve a pack's cover: manual override first, then the keyword table.
pub fn resolve_cover<'a>(
    pack: &Pack,
    manual: &'a ManualCovers,
    table: &'a CoverTable,
) -> Option<&'a str> {
    manual.get(pack.id()).or_else(|| table.resolve(pack))
}
