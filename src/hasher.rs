//! Zobrist fingerprints of search states.
//!
//! Every (cell, occupied) pair and every (shape, remaining count) pair gets
//! an independent random 64-bit key. A state's fingerprint is the XOR of the
//! keys of its occupied cells and of each shape's current count, so placing
//! a piece updates the fingerprint with a handful of XORs.
//!
//! Fingerprints are memo keys, not proofs of equality: two different states
//! may collide. See [`MemoMode`](crate::config::MemoMode) for the verified
//! alternative.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::CellMask;

/// Random key tables for one container size and one set of count limits.
#[derive(Clone, Debug)]
pub struct ZobristHasher {
    cell_keys: Vec<u64>,
    /// `count_keys[shape][count]` for `count` in `0..=max_count`.
    count_keys: Vec<Vec<u64>>,
}

impl ZobristHasher {
    /// Draws key tables from a generator seeded with `seed`.
    ///
    /// The same seed, cell count and limits always produce the same keys.
    pub fn new(seed: u64, cells: usize, max_counts: &[u32]) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let cell_keys = (0..cells).map(|_| rng.random()).collect();
        let count_keys = max_counts
            .iter()
            .map(|&max| (0..=max).map(|_| rng.random()).collect())
            .collect();

        Self {
            cell_keys,
            count_keys,
        }
    }

    /// Fingerprint of a full state, computed from scratch.
    pub fn fingerprint(&self, occupancy: &CellMask, counts: &[u32]) -> u64 {
        let cells = occupancy
            .ones()
            .fold(0, |acc, cell| acc ^ self.cell_keys[cell]);
        counts
            .iter()
            .enumerate()
            .fold(cells, |acc, (shape, &count)| {
                acc ^ self.count_keys[shape][count as usize]
            })
    }

    /// Combined key of the cells in a placement mask.
    pub fn mask_key(&self, mask: &CellMask) -> u64 {
        mask.ones().fold(0, |acc, cell| acc ^ self.cell_keys[cell])
    }

    /// Fingerprint after placing one copy of `shape`.
    ///
    /// `mask_key` comes from [`Self::mask_key`] for the placed mask and
    /// `old_count` is the shape's count before the placement (at least 1).
    #[inline]
    pub fn step(&self, fingerprint: u64, mask_key: u64, shape: usize, old_count: u32) -> u64 {
        let keys = &self.count_keys[shape];
        fingerprint ^ mask_key ^ keys[old_count as usize] ^ keys[old_count as usize - 1]
    }
}
