//! Outcome cache for search states.

use rustc_hash::FxHashMap;

use crate::config::MemoMode;
use crate::grid::CellMask;

/// Full identity of a search state, kept only in [`MemoMode::Verified`].
#[derive(Clone, Debug, PartialEq, Eq)]
struct StateKey {
    occupancy: CellMask,
    counts: Box<[u32]>,
}

#[derive(Clone, Debug)]
struct Entry {
    feasible: bool,
    key: Option<Box<StateKey>>,
}

/// Memo hit/miss counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoStats {
    pub hits: u64,
    pub misses: u64,
    /// Fingerprint matches whose stored state differed (verified mode only).
    pub collisions: u64,
    /// Outcomes dropped because the table was full.
    pub rejected: u64,
}

/// Maps state fingerprints to known outcomes.
///
/// Entries are write-once per key in practice: re-deriving a state from
/// another path always yields the same outcome.
pub struct MemoTable {
    mode: MemoMode,
    capacity: usize,
    entries: FxHashMap<u64, Entry>,
    stats: MemoStats,
}

impl MemoTable {
    pub fn new(mode: MemoMode, capacity: usize) -> Self {
        Self {
            mode,
            capacity,
            entries: FxHashMap::default(),
            stats: MemoStats::default(),
        }
    }

    /// Looks up a state's outcome.
    pub fn get(&mut self, fingerprint: u64, occupancy: &CellMask, counts: &[u32]) -> Option<bool> {
        if self.mode == MemoMode::Off {
            return None;
        }

        let Some(entry) = self.entries.get(&fingerprint) else {
            self.stats.misses += 1;
            return None;
        };

        if let Some(key) = &entry.key {
            if key.occupancy != *occupancy || *key.counts != *counts {
                self.stats.collisions += 1;
                self.stats.misses += 1;
                return None;
            }
        }

        self.stats.hits += 1;
        Some(entry.feasible)
    }

    /// Records a state's outcome.
    ///
    /// Returns `false` when the table is full and the outcome was dropped.
    pub fn insert(&mut self, fingerprint: u64, occupancy: &CellMask, counts: &[u32], feasible: bool) -> bool {
        if self.mode == MemoMode::Off {
            return true;
        }

        if self.entries.len() >= self.capacity && !self.entries.contains_key(&fingerprint) {
            self.stats.rejected += 1;
            return false;
        }

        let key = (self.mode == MemoMode::Verified).then(|| {
            Box::new(StateKey {
                occupancy: occupancy.clone(),
                counts: counts.into(),
            })
        });
        self.entries.insert(fingerprint, Entry { feasible, key });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> MemoStats {
        self.stats
    }

    /// Drops every entry and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = MemoStats::default();
    }
}
