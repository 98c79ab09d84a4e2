//! Solver configuration and defaults.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Fixed seed for reproducible Zobrist keys.
pub const DEFAULT_SEED: u64 = 42;

/// Default cap on memo entries (about 100 MB of fingerprint-only entries).
pub const DEFAULT_MAX_MEMO_ENTRIES: usize = 1 << 22;

/// Which packings count as a success.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Coverage {
    /// Every container cell must be covered.
    #[default]
    Exact,
    /// All required pieces must fit; leftover cells may stay empty.
    Partial,
}

/// How search states are keyed in the memo table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemoMode {
    /// Key by 64-bit fingerprint only. Collisions are accepted as negligible.
    #[default]
    Fingerprint,
    /// Also store the full state and treat a fingerprint match with a
    /// different state as a miss.
    Verified,
    /// No memoization.
    Off,
}

/// Limits that stop a search before it reaches an answer.
#[derive(Clone, Debug, Default)]
pub struct Budget {
    /// Maximum search states expanded.
    pub max_nodes: Option<u64>,
    /// Wall-clock limit, measured from the start of the solve call.
    pub timeout: Option<Duration>,
    /// Cooperative cancellation flag, polled between states.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Budget {
    /// True when no limit is set.
    pub fn is_unbounded(&self) -> bool {
        self.max_nodes.is_none() && self.timeout.is_none() && self.cancel.is_none()
    }
}

/// Everything that tunes a solve.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    pub coverage: Coverage,
    /// Only allow placements with a cell on the container edge.
    pub border_contact: bool,
    pub memo: MemoMode,
    /// Seed for the Zobrist key tables.
    pub seed: u64,
    /// Entries kept in the memo table; once full, no new outcomes are stored.
    pub max_memo_entries: usize,
    pub budget: Budget,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            coverage: Coverage::default(),
            border_contact: false,
            memo: MemoMode::default(),
            seed: DEFAULT_SEED,
            max_memo_entries: DEFAULT_MAX_MEMO_ENTRIES,
            budget: Budget::default(),
        }
    }
}

impl SolverConfig {
    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    pub fn with_border_contact(mut self, border_contact: bool) -> Self {
        self.border_contact = border_contact;
        self
    }

    pub fn with_memo(mut self, memo: MemoMode) -> Self {
        self.memo = memo;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_memo_entries(mut self, max_memo_entries: usize) -> Self {
        self.max_memo_entries = max_memo_entries;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.budget.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.budget.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.budget.cancel = Some(cancel);
        self
    }
}
