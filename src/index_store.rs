use std::path::{Path, PathBuf};

use anyhow::Result;
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::model::{IndexEntry, IndexSummary, UNKNOWN_BUCKET};
use crate::util::{now_utc_string, read_json, write_json_atomic};

/// Persistent `characterId -> IndexEntry` map; the only record of which
/// cards are already saved.
#[derive(Debug)]
pub struct IndexStore {
    path: PathBuf,
    entries: IndexMap<String, IndexEntry>,
}

impl IndexStore {
    /// A missing file yields an empty store; an unreadable one is logged and
    /// also treated as empty so the crawl can rebuild it.
    pub fn load(path: &Path) -> Self {
        let entries = if path.exists() {
            match read_json::<IndexMap<String, IndexEntry>>(path) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "index file unreadable; starting with an empty index"
                    );
                    IndexMap::new()
                }
            }
        } else {
            IndexMap::new()
        };

        info!(path = %path.display(), entries = entries.len(), "loaded card index");
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has(&self, character_id: &str) -> bool {
        self.entries.contains_key(character_id)
    }

    pub fn get(&self, character_id: &str) -> Option<&IndexEntry> {
        self.entries.get(character_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts the entry and rewrites the file atomically. Existing ids are
    /// left untouched and reported as `false`. A failed write leaves the
    /// in-memory map as it was.
    pub fn upsert(&mut self, character_id: &str, entry: IndexEntry) -> Result<bool> {
        if self.has(character_id) {
            return Ok(false);
        }
        self.entries.insert(character_id.to_string(), entry);
        if let Err(err) = write_json_atomic(&self.path, &self.entries) {
            self.entries.shift_remove(character_id);
            return Err(err);
        }
        Ok(true)
    }

    pub fn summary(&self) -> IndexSummary {
        let mut by_rarity: IndexMap<String, usize> = IndexMap::new();
        let mut by_type: IndexMap<String, usize> = IndexMap::new();
        for entry in self.entries.values() {
            let rarity = entry
                .rarity
                .map(|value| value.to_string())
                .unwrap_or_else(|| UNKNOWN_BUCKET.to_string());
            *by_rarity.entry(rarity).or_default() += 1;

            let card_type = entry
                .card_type
                .clone()
                .unwrap_or_else(|| UNKNOWN_BUCKET.to_string());
            *by_type.entry(card_type).or_default() += 1;
        }
        by_rarity.sort_keys();
        by_type.sort_keys();

        IndexSummary {
            generated_at: now_utc_string(),
            index_path: self.path.display().to_string(),
            total_cards: self.entries.len(),
            by_rarity,
            by_type,
        }
    }
}
