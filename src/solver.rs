//! Backtracking packing solver.
//!
//! Key techniques:
//! - Bitmask occupancy with precomputed placement masks for collision checks
//! - Most-constrained empty cell chosen at every state (fewest fitting placements)
//! - Dead-cell check on every child before it is pushed
//! - Zobrist-keyed memo table so states reached along different paths
//!   (e.g. two copies of one shape placed in either order) are searched once
//! - Explicit frame stack instead of recursion, so deep searches cannot
//!   overflow the call stack
//!
//! In [`Coverage::Partial`] mode the leftover area is modelled as an extra
//! one-cell "gap" piece whose count is the slack, which turns the problem back
//! into an exact cover and lets the same search and pruning apply unchanged.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{debug, warn};

use crate::config::{Budget, Coverage, SolverConfig};
use crate::error::{PackError, Result};
use crate::grid::{idx_to_coord, CellMask, Packing, PlacedPiece};
use crate::hasher::ZobristHasher;
use crate::memo::{MemoStats, MemoTable};
use crate::placement::{PlacementTable, ShapePlacements};
use crate::pieces::Region;

/// Why a search stopped without an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exhausted {
    NodeBudget,
    Deadline,
    Cancelled,
}

impl fmt::Display for Exhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeBudget => f.write_str("node budget exhausted"),
            Self::Deadline => f.write_str("deadline reached"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Result of solving one region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The pieces fit; one valid packing is attached.
    Feasible(Packing),
    /// The pieces provably do not fit.
    Infeasible,
    /// A budget ran out first.
    Inconclusive(Exhausted),
}

impl Outcome {
    #[inline]
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible(_))
    }

    /// The packing, if one was found.
    pub fn packing(&self) -> Option<&Packing> {
        match self {
            Self::Feasible(packing) => Some(packing),
            _ => None,
        }
    }

    /// Collapses the outcome to a yes/no answer.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Inconclusive`] when the search was cut short.
    pub fn into_bool(self) -> Result<bool> {
        match self {
            Self::Feasible(_) => Ok(true),
            Self::Infeasible => Ok(false),
            Self::Inconclusive(reason) => Err(PackError::Inconclusive(reason)),
        }
    }
}

/// Search counters for one solve call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// States entered (including memo hits).
    pub nodes: u64,
    /// Children discarded by the dead-cell check.
    pub pruned: u64,
    /// States whose most-constrained cell had no fitting placement.
    pub dead_ends: u64,
    /// Deepest frame stack reached.
    pub max_depth: usize,
    pub memo: MemoStats,
}

/// A state on the explicit search stack.
///
/// `kind_cursor` and `placement_cursor` remember which alternative to try
/// next, so a popped-back frame resumes exactly where it left off.
struct Frame {
    occupancy: CellMask,
    counts: Vec<u32>,
    fingerprint: u64,
    /// Most-constrained empty cell every child must cover.
    target: usize,
    /// Position in `Search::order`.
    kind_cursor: usize,
    /// Position in the current kind's covering list for `target`.
    placement_cursor: usize,
    /// Placement that produced this state, `(kind, placement index)`.
    placed: Option<(usize, u32)>,
}

/// A child state produced from a frame, not yet entered.
struct Child {
    occupancy: CellMask,
    counts: Vec<u32>,
    fingerprint: u64,
    placed: (usize, u32),
}

enum Step {
    Solved,
    Failed,
    Expand(Frame),
}

/// Read-only search context shared by every frame.
///
/// A "kind" is a catalogue shape, or the gap piece at index `shapes` in
/// partial-coverage mode.
struct Search<'a> {
    width: usize,
    /// Number of real catalogue shapes.
    shapes: usize,
    kinds: Vec<Cow<'a, ShapePlacements>>,
    /// Kinds with a nonzero starting count, largest first.
    order: Vec<usize>,
    /// Zobrist key of each placement mask, `[kind][placement]`.
    mask_keys: Vec<Vec<u64>>,
    hasher: ZobristHasher,
}

impl Search<'_> {
    #[inline]
    fn all_placed(&self, counts: &[u32]) -> bool {
        counts[..self.shapes].iter().all(|&count| count == 0)
    }

    /// Number of placements of available kinds that cover `cell` without
    /// overlapping `occupancy`, counting no further than `limit`.
    fn options(&self, cell: usize, occupancy: &CellMask, counts: &[u32], limit: usize) -> usize {
        let mut options = 0;
        for &kind in &self.order {
            if counts[kind] == 0 {
                continue;
            }
            for placement in self.kinds[kind].covering(cell) {
                if !placement.mask.intersects(occupancy) {
                    options += 1;
                    if options >= limit {
                        return options;
                    }
                }
            }
        }
        options
    }

    /// The empty cell with the fewest fitting placements, lowest index on ties.
    ///
    /// Returns `None` when some empty cell has no fitting placement at all,
    /// or when there is no empty cell left.
    fn most_constrained_cell(&self, occupancy: &CellMask, counts: &[u32]) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for cell in occupancy.zeros() {
            let limit = best.map_or(usize::MAX, |(_, options)| options);
            let options = self.options(cell, occupancy, counts, limit);
            if options == 0 {
                return None;
            }
            if options < limit {
                best = Some((cell, options));
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// True when some empty cell can no longer be covered by any fitting
    /// placement of an available kind.
    fn has_dead_cell(&self, occupancy: &CellMask, counts: &[u32]) -> bool {
        occupancy
            .zeros()
            .any(|cell| self.options(cell, occupancy, counts, 1) == 0)
    }

    /// Advances `frame` to its next viable child.
    ///
    /// Children overlapping the frame's occupancy are skipped; children that
    /// leave a dead cell are counted in `stats.pruned` and skipped.
    fn next_child(&self, frame: &mut Frame, stats: &mut SolveStats) -> Option<Child> {
        while let Some(&kind) = self.order.get(frame.kind_cursor) {
            let count = frame.counts[kind];
            if count > 0 {
                let shape = &self.kinds[kind];
                let covering = &shape.covering[frame.target];

                while let Some(&index) = covering.get(frame.placement_cursor) {
                    frame.placement_cursor += 1;

                    let mask = &shape.placements[index as usize].mask;
                    if mask.intersects(&frame.occupancy) {
                        continue;
                    }

                    let occupancy = frame.occupancy.with(mask);
                    let mut counts = frame.counts.clone();
                    counts[kind] -= 1;

                    if !self.all_placed(&counts) && self.has_dead_cell(&occupancy, &counts) {
                        stats.pruned += 1;
                        continue;
                    }

                    let mask_key = self.mask_keys[kind][index as usize];
                    return Some(Child {
                        occupancy,
                        counts,
                        fingerprint: self.hasher.step(frame.fingerprint, mask_key, kind, count),
                        placed: (kind, index),
                    });
                }
            }

            // move to the next kind, restart its placement list
            frame.kind_cursor += 1;
            frame.placement_cursor = 0;
        }
        None
    }

    fn placed_piece(&self, (kind, index): (usize, u32)) -> Option<PlacedPiece> {
        if kind >= self.shapes {
            return None;
        }
        let placement = &self.kinds[kind].placements[index as usize];
        let cells = placement
            .mask
            .ones()
            .map(|cell| {
                let (r, c) = idx_to_coord(self.width, cell);
                (r as i32, c as i32)
            })
            .collect();
        Some(PlacedPiece {
            shape_index: kind,
            orientation: placement.orientation,
            origin: placement.origin,
            cells,
        })
    }
}

/// Solves one region against a prebuilt placement table.
pub struct Solver<'a> {
    search: Search<'a>,
    width: usize,
    height: usize,
    /// Set when the area or an unplaceable shape already rules the region out.
    infeasible: bool,
    initial_counts: Vec<u32>,
    memo: MemoTable,
    budget: Budget,
    stats: SolveStats,
    memo_full_reported: bool,
}

impl<'a> Solver<'a> {
    /// Prepares a solve of `region` using `table`.
    ///
    /// # Errors
    ///
    /// Returns a data error when the region is malformed or does not match
    /// the table's container size or catalogue.
    pub fn new(table: &'a PlacementTable, region: &Region, config: &SolverConfig) -> Result<Self> {
        if region.width == 0 || region.height == 0 {
            return Err(PackError::EmptyRegion {
                width: region.width,
                height: region.height,
            });
        }
        if (region.width, region.height) != (table.width, table.height) {
            return Err(PackError::SizeMismatch {
                expected: (table.width, table.height),
                found: (region.width, region.height),
            });
        }
        if region.counts.len() != table.shapes.len() {
            return Err(PackError::CountMismatch {
                width: region.width,
                height: region.height,
                given: region.counts.len(),
                expected: table.shapes.len(),
            });
        }

        let shapes = table.shapes.len();
        let area = table.cells();
        let required_area = region
            .counts
            .iter()
            .zip(&table.shapes)
            .map(|(&count, shape)| (count as usize).saturating_mul(shape.size))
            .fold(0, usize::saturating_add);

        let mut kinds: Vec<Cow<'a, ShapePlacements>> = if config.border_contact {
            table
                .shapes
                .iter()
                .map(|shape| Cow::Owned(shape.touching_border(table.width, table.height)))
                .collect()
        } else {
            table.shapes.iter().map(Cow::Borrowed).collect()
        };
        let mut initial_counts = region.counts.clone();

        let area_ok = match config.coverage {
            Coverage::Exact => required_area == area,
            Coverage::Partial => required_area <= area,
        };
        // a required shape that fits nowhere can never be placed
        let unplaceable = initial_counts
            .iter()
            .zip(&kinds)
            .any(|(&count, kind)| count > 0 && kind.placements.is_empty());
        let infeasible = !area_ok || unplaceable;

        let slack = area.saturating_sub(required_area);
        if config.coverage == Coverage::Partial && slack > 0 {
            kinds.push(Cow::Owned(ShapePlacements::build(
                &[vec![(0, 0)]],
                1,
                table.width,
                table.height,
            )));
            initial_counts.push(slack as u32);
        }

        // bulky pieces first; stable sort keeps catalogue order on ties and the gap last
        let mut order: Vec<usize> = (0..kinds.len())
            .filter(|&kind| initial_counts[kind] > 0)
            .collect();
        order.sort_by_key(|&kind| std::cmp::Reverse(kinds[kind].size));

        // counts beyond what the area holds only occur in infeasible regions,
        // which are never searched
        let key_limits: Vec<u32> = initial_counts
            .iter()
            .zip(&kinds)
            .map(|(&count, kind)| {
                let fits = area / kind.size.max(1);
                count.min(u32::try_from(fits).unwrap_or(u32::MAX))
            })
            .collect();
        let hasher = ZobristHasher::new(config.seed, area, &key_limits);
        let mask_keys = kinds
            .iter()
            .map(|kind| {
                kind.placements
                    .iter()
                    .map(|placement| hasher.mask_key(&placement.mask))
                    .collect()
            })
            .collect();

        Ok(Self {
            search: Search {
                width: table.width,
                shapes,
                kinds,
                order,
                mask_keys,
                hasher,
            },
            width: table.width,
            height: table.height,
            infeasible,
            initial_counts,
            memo: MemoTable::new(config.memo, config.max_memo_entries),
            budget: config.budget.clone(),
            stats: SolveStats::default(),
            memo_full_reported: false,
        })
    }

    /// Counters from the last [`Self::run`].
    pub fn stats(&self) -> SolveStats {
        SolveStats {
            memo: self.memo.stats(),
            ..self.stats
        }
    }

    /// Runs the search to completion or until a budget runs out.
    ///
    /// Each call starts from a clean memo table and fresh counters.
    pub fn run(&mut self) -> Outcome {
        self.memo.clear();
        self.stats = SolveStats::default();
        self.memo_full_reported = false;

        let started = Instant::now();
        debug!(
            "solving {}x{} region, counts {:?}, {} placements",
            self.width,
            self.height,
            &self.initial_counts[..self.search.shapes],
            self.search.mask_keys.iter().map(Vec::len).sum::<usize>()
        );

        let outcome = self.search_all(started);

        let stats = self.stats();
        debug!(
            "{}x{} region: {} after {} nodes ({} pruned, {} dead ends, depth {}), memo {} hits / {} misses, {:?}",
            self.width,
            self.height,
            match &outcome {
                Outcome::Feasible(_) => "feasible".to_string(),
                Outcome::Infeasible => "infeasible".to_string(),
                Outcome::Inconclusive(reason) => reason.to_string(),
            },
            stats.nodes,
            stats.pruned,
            stats.dead_ends,
            stats.max_depth,
            stats.memo.hits,
            stats.memo.misses,
            started.elapsed()
        );
        outcome
    }

    fn search_all(&mut self, started: Instant) -> Outcome {
        if self.infeasible {
            return Outcome::Infeasible;
        }

        let occupancy = CellMask::empty(self.width * self.height);
        let counts = self.initial_counts.clone();
        let fingerprint = self.search.hasher.fingerprint(&occupancy, &counts);

        let root = match self.enter(occupancy, counts, fingerprint, None) {
            Step::Solved => return Outcome::Feasible(self.packing(&[], None)),
            Step::Failed => return Outcome::Infeasible,
            Step::Expand(frame) => frame,
        };

        let mut stack = vec![root];
        self.stats.max_depth = 1;

        loop {
            if let Some(reason) = self.exhausted(started) {
                return Outcome::Inconclusive(reason);
            }

            let Some(frame) = stack.last_mut() else {
                return Outcome::Infeasible;
            };

            let Some(child) = self.search.next_child(frame, &mut self.stats) else {
                // every alternative failed
                if let Some(frame) = stack.pop() {
                    self.record(frame.fingerprint, &frame.occupancy, &frame.counts, false);
                }
                continue;
            };

            let placed = child.placed;
            match self.enter(child.occupancy, child.counts, child.fingerprint, Some(placed)) {
                Step::Solved => {
                    for frame in &stack {
                        self.record(frame.fingerprint, &frame.occupancy, &frame.counts, true);
                    }
                    return Outcome::Feasible(self.packing(&stack, Some(placed)));
                }
                Step::Failed => {}
                Step::Expand(frame) => {
                    stack.push(frame);
                    self.stats.max_depth = self.stats.max_depth.max(stack.len());
                }
            }
        }
    }

    /// Classifies a newly reached state.
    fn enter(
        &mut self,
        occupancy: CellMask,
        counts: Vec<u32>,
        fingerprint: u64,
        placed: Option<(usize, u32)>,
    ) -> Step {
        self.stats.nodes += 1;

        if let Some(feasible) = self.memo.get(fingerprint, &occupancy, &counts) {
            return if feasible { Step::Solved } else { Step::Failed };
        }

        if self.search.all_placed(&counts) {
            self.record(fingerprint, &occupancy, &counts, true);
            return Step::Solved;
        }

        let Some(target) = self.search.most_constrained_cell(&occupancy, &counts) else {
            self.stats.dead_ends += 1;
            self.record(fingerprint, &occupancy, &counts, false);
            return Step::Failed;
        };

        Step::Expand(Frame {
            occupancy,
            counts,
            fingerprint,
            target,
            kind_cursor: 0,
            placement_cursor: 0,
            placed,
        })
    }

    fn record(&mut self, fingerprint: u64, occupancy: &CellMask, counts: &[u32], feasible: bool) {
        if !self.memo.insert(fingerprint, occupancy, counts, feasible) && !self.memo_full_reported {
            warn!(
                "memo table full at {} entries; further states are not cached",
                self.memo.len()
            );
            self.memo_full_reported = true;
        }
    }

    fn exhausted(&self, started: Instant) -> Option<Exhausted> {
        if let Some(cancel) = &self.budget.cancel {
            if cancel.load(Ordering::Relaxed) {
                return Some(Exhausted::Cancelled);
            }
        }
        if let Some(max_nodes) = self.budget.max_nodes {
            if self.stats.nodes >= max_nodes {
                return Some(Exhausted::NodeBudget);
            }
        }
        if let Some(timeout) = self.budget.timeout {
            if started.elapsed() >= timeout {
                return Some(Exhausted::Deadline);
            }
        }
        None
    }

    fn packing(&self, stack: &[Frame], last: Option<(usize, u32)>) -> Packing {
        let pieces = stack
            .iter()
            .filter_map(|frame| frame.placed)
            .chain(last)
            .filter_map(|placed| self.search.placed_piece(placed))
            .collect();
        Packing::from_pieces(self.width, self.height, pieces)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::MemoMode;
    use crate::pieces::catalogue::*;
    use crate::pieces::{Cell, Shape};

    fn catalogue(pieces: &[&[Cell]]) -> Vec<Shape> {
        pieces
            .iter()
            .enumerate()
            .map(|(id, cells)| Shape::new(id, cells.iter().copied()).unwrap())
            .collect()
    }

    fn run(shapes: &[Shape], region: &Region, config: &SolverConfig) -> Outcome {
        let table = PlacementTable::build(shapes, region.width, region.height);
        Solver::new(&table, region, config).unwrap().run()
    }

    /// Checks that a packing uses exactly the required pieces without overlap.
    fn assert_valid_packing(shapes: &[Shape], region: &Region, packing: &Packing, exact: bool) {
        let mut used = vec![0u32; shapes.len()];
        let mut seen = vec![false; region.area()];
        for piece in &packing.pieces {
            used[piece.shape_index] += 1;
            let normalized = crate::geometry::normalize_to_origin(piece.cells.clone());
            assert!(shapes[piece.shape_index].orientations().contains(&normalized));
            for &(r, c) in &piece.cells {
                assert!((r as usize) < region.height && (c as usize) < region.width);
                let idx = r as usize * region.width + c as usize;
                assert!(!seen[idx], "cell ({r}, {c}) covered twice");
                seen[idx] = true;
            }
        }
        assert_eq!(used, region.counts);
        if exact {
            assert!(seen.iter().all(|&s| s));
            assert_eq!(packing.covered(), region.area());
        }
    }

    #[test]
    fn test_single_cells_fill_square() {
        let shapes = catalogue(&[MONOMINO]);
        let region = Region::new(2, 2, vec![4]);
        let outcome = run(&shapes, &region, &SolverConfig::default());
        let packing = outcome.packing().unwrap();
        assert_valid_packing(&shapes, &region, packing, true);
    }

    #[test]
    fn test_too_many_single_cells() {
        let shapes = catalogue(&[MONOMINO]);
        let region = Region::new(2, 2, vec![5]);
        assert_eq!(run(&shapes, &region, &SolverConfig::default()), Outcome::Infeasible);
        let partial = SolverConfig::default().with_coverage(Coverage::Partial);
        assert_eq!(run(&shapes, &region, &partial), Outcome::Infeasible);
    }

    #[test]
    fn test_lone_tromino_depends_on_coverage() {
        let shapes = catalogue(&[L_TROMINO]);
        let region = Region::new(2, 2, vec![1]);
        assert_eq!(run(&shapes, &region, &SolverConfig::default()), Outcome::Infeasible);

        let partial = SolverConfig::default().with_coverage(Coverage::Partial);
        let outcome = run(&shapes, &region, &partial);
        let packing = outcome.packing().unwrap();
        assert_valid_packing(&shapes, &region, packing, false);
        assert_eq!(packing.covered(), 3);
    }

    #[test]
    fn test_two_dominoes_tile_square() {
        let shapes = catalogue(&[DOMINO]);
        let region = Region::new(2, 2, vec![2]);
        let outcome = run(&shapes, &region, &SolverConfig::default());
        assert_valid_packing(&shapes, &region, outcome.packing().unwrap(), true);
    }

    #[test]
    fn test_mixed_catalogue_exact_tiling() {
        // 4x5 = 20 = 2 * 4 (L) + 2 * 4 (T) + 4 (O)
        let shapes = catalogue(&[L_TETROMINO, T_TETROMINO, O_TETROMINO]);
        let region = Region::new(4, 5, vec![2, 2, 1]);
        let outcome = run(&shapes, &region, &SolverConfig::default());
        assert_valid_packing(&shapes, &region, outcome.packing().unwrap(), true);
    }

    #[test]
    fn test_parity_makes_t_tetrominoes_fail() {
        // a single T covers 3 cells of one checkerboard colour, so an odd
        // number of Ts can never tile a rectangle with equal colour counts
        let shapes = catalogue(&[T_TETROMINO, O_TETROMINO]);
        let region = Region::new(4, 4, vec![1, 3]);
        let config = SolverConfig::default();
        assert_eq!(run(&shapes, &region, &config), Outcome::Infeasible);
    }

    #[test]
    fn test_area_match_but_geometry_fails() {
        // S tetrominoes never tile a rectangle
        let shapes = catalogue(&[S_TETROMINO]);
        let region = Region::new(4, 2, vec![2]);
        assert_eq!(run(&shapes, &region, &SolverConfig::default()), Outcome::Infeasible);
    }

    #[test]
    fn test_piece_larger_than_region() {
        let shapes = catalogue(&[F_PENTOMINO, MONOMINO]);
        let region = Region::new(2, 2, vec![1, 0]);
        let partial = SolverConfig::default().with_coverage(Coverage::Partial);
        assert_eq!(run(&shapes, &region, &partial), Outcome::Infeasible);
    }

    #[test]
    fn test_no_pieces_required() {
        let shapes = catalogue(&[DOMINO]);
        let region = Region::new(3, 3, vec![0]);
        assert_eq!(run(&shapes, &region, &SolverConfig::default()), Outcome::Infeasible);

        let partial = SolverConfig::default().with_coverage(Coverage::Partial);
        let outcome = run(&shapes, &region, &partial);
        assert_eq!(outcome.packing().unwrap().covered(), 0);
    }

    #[test]
    fn test_partial_monotonicity() {
        let shapes = catalogue(&[L_TROMINO, DOMINO]);
        let partial = SolverConfig::default().with_coverage(Coverage::Partial);
        let full = Region::new(3, 3, vec![2, 1]);
        assert!(run(&shapes, &full, &partial).is_feasible());

        for counts in [vec![2, 0], vec![1, 1], vec![1, 0], vec![0, 1], vec![0, 0]] {
            let region = Region::new(3, 3, counts);
            let outcome = run(&shapes, &region, &partial);
            assert_valid_packing(&shapes, &region, outcome.packing().unwrap(), false);
        }
    }

    #[test]
    fn test_memo_modes_agree() {
        let shapes = catalogue(&[L_TROMINO, DOMINO, MONOMINO]);
        for (width, height, counts) in [
            (3, 3, vec![3, 0, 0]),
            (4, 3, vec![4, 0, 0]),
            (5, 3, vec![3, 3, 0]),
            (3, 3, vec![2, 1, 1]),
            (5, 5, vec![5, 4, 2]),
            (4, 4, vec![0, 7, 1]),
        ] {
            let region = Region::new(width, height, counts);
            let answers: Vec<bool> = [MemoMode::Fingerprint, MemoMode::Verified, MemoMode::Off]
                .into_iter()
                .map(|memo| {
                    let config = SolverConfig::default().with_memo(memo);
                    run(&shapes, &region, &config).is_feasible()
                })
                .collect();
            assert!(
                answers.iter().all(|&answer| answer == answers[0]),
                "memo modes disagree on {region:?}: {answers:?}"
            );
        }
    }

    #[test]
    fn test_l_trominoes_in_small_rectangles() {
        // the 3x3 square is the classic rectangle of area divisible by 3
        // that L trominoes cannot tile; 4x3 splits into two 2x3 blocks
        let shapes = catalogue(&[L_TROMINO]);
        let config = SolverConfig::default();
        assert_eq!(run(&shapes, &Region::new(3, 3, vec![3]), &config), Outcome::Infeasible);

        let region = Region::new(4, 3, vec![4]);
        let outcome = run(&shapes, &region, &config);
        assert_valid_packing(&shapes, &region, outcome.packing().unwrap(), true);
    }

    #[test]
    fn test_deterministic_answer_and_packing() {
        let shapes = catalogue(&[L_TETROMINO, T_TETROMINO, O_TETROMINO]);
        let region = Region::new(4, 5, vec![2, 2, 1]);
        let first = run(&shapes, &region, &SolverConfig::default());
        let second = run(&shapes, &region, &SolverConfig::default());
        assert_eq!(first, second);
        let reseeded = run(&shapes, &region, &SolverConfig::default().with_seed(7));
        assert_eq!(first.is_feasible(), reseeded.is_feasible());
    }

    #[test]
    fn test_node_budget_is_inconclusive() {
        let shapes = catalogue(&[L_TETROMINO, T_TETROMINO, O_TETROMINO]);
        let region = Region::new(4, 5, vec![2, 2, 1]);
        let config = SolverConfig::default().with_max_nodes(1);
        assert_eq!(
            run(&shapes, &region, &config),
            Outcome::Inconclusive(Exhausted::NodeBudget)
        );
    }

    #[test]
    fn test_cancellation_is_inconclusive() {
        let shapes = catalogue(&[DOMINO]);
        let region = Region::new(4, 4, vec![8]);
        let cancel = Arc::new(AtomicBool::new(true));
        let config = SolverConfig::default().with_cancel(cancel);
        let outcome = run(&shapes, &region, &config);
        assert_eq!(outcome, Outcome::Inconclusive(Exhausted::Cancelled));
        assert!(matches!(
            outcome.into_bool(),
            Err(PackError::Inconclusive(Exhausted::Cancelled))
        ));
    }

    #[test]
    fn test_tiny_memo_still_correct() {
        let shapes = catalogue(&[L_TROMINO, DOMINO]);
        let region = Region::new(5, 3, vec![3, 3]);
        let config = SolverConfig::default().with_max_memo_entries(1);
        let outcome = run(&shapes, &region, &config);
        assert_valid_packing(&shapes, &region, outcome.packing().unwrap(), true);
    }

    #[test]
    fn test_stats_are_collected() {
        let shapes = catalogue(&[S_TETROMINO]);
        let region = Region::new(4, 4, vec![4]);
        let table = PlacementTable::build(&shapes, 4, 4);
        let mut solver = Solver::new(&table, &region, &SolverConfig::default()).unwrap();
        assert_eq!(solver.run(), Outcome::Infeasible);
        let stats = solver.stats();
        assert!(stats.nodes >= 1);
        assert!(stats.memo.misses >= 1);
    }

    #[test]
    fn test_huge_count_is_rejected_without_search() {
        let shapes = catalogue(&[MONOMINO]);
        let region = Region::new(1, 1, vec![u32::MAX]);
        for coverage in [Coverage::Exact, Coverage::Partial] {
            let config = SolverConfig::default().with_coverage(coverage);
            let table = PlacementTable::build(&shapes, 1, 1);
            let mut solver = Solver::new(&table, &region, &config).unwrap();
            assert_eq!(solver.run(), Outcome::Infeasible);
            assert_eq!(solver.stats().nodes, 0);
        }
    }

    #[test]
    fn test_repeated_runs_give_the_same_packing() {
        let shapes = catalogue(&[DOMINO]);
        let region = Region::new(2, 2, vec![2]);
        let table = PlacementTable::build(&shapes, 2, 2);
        let mut solver = Solver::new(&table, &region, &SolverConfig::default()).unwrap();

        let first = solver.run();
        let first_stats = solver.stats();
        let second = solver.run();
        assert_eq!(first, second);
        assert_eq!(solver.stats(), first_stats);
        assert_valid_packing(&shapes, &region, second.packing().unwrap(), true);
    }

    #[test]
    fn test_zero_timeout_is_inconclusive() {
        let shapes = catalogue(&[L_TETROMINO, T_TETROMINO, O_TETROMINO]);
        let region = Region::new(4, 5, vec![2, 2, 1]);
        let config = SolverConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(
            run(&shapes, &region, &config),
            Outcome::Inconclusive(Exhausted::Deadline)
        );
    }

    #[test]
    fn test_border_contact_excludes_interior_cells() {
        let shapes = catalogue(&[MONOMINO]);
        let border = SolverConfig::default().with_border_contact(true);

        // the centre cell of a 3x3 can only hold a piece that misses every edge
        let full = Region::new(3, 3, vec![9]);
        assert!(run(&shapes, &full, &SolverConfig::default()).is_feasible());
        assert_eq!(run(&shapes, &full, &border), Outcome::Infeasible);

        let ring = Region::new(3, 3, vec![8]);
        let partial = border.with_coverage(Coverage::Partial);
        let outcome = run(&shapes, &ring, &partial);
        let packing = outcome.packing().unwrap();
        assert_valid_packing(&shapes, &ring, packing, false);
        assert_eq!(packing.at(1, 1), None);
    }

    #[test]
    fn test_border_contact_still_allows_long_pieces() {
        // an L tetromino never fits inside the 2x2 interior of a 4x4
        let shapes = catalogue(&[L_TETROMINO]);
        let region = Region::new(4, 4, vec![4]);
        let plain = run(&shapes, &region, &SolverConfig::default());
        let border = run(
            &shapes,
            &region,
            &SolverConfig::default().with_border_contact(true),
        );
        assert!(plain.is_feasible());
        assert!(border.is_feasible());
        assert_valid_packing(&shapes, &region, border.packing().unwrap(), true);
    }

    #[test]
    fn test_placed_pieces_record_orientation_and_origin() {
        let shapes = catalogue(&[L_TETROMINO, T_TETROMINO, O_TETROMINO]);
        let region = Region::new(4, 5, vec![2, 2, 1]);
        let outcome = run(&shapes, &region, &SolverConfig::default());
        for piece in &outcome.packing().unwrap().pieces {
            let orientation = &shapes[piece.shape_index].orientations()[piece.orientation];
            let (r, c) = piece.origin;
            let mut expected: Vec<Cell> = orientation
                .iter()
                .map(|&(dr, dc)| (r as i32 + dr, c as i32 + dc))
                .collect();
            expected.sort_unstable();
            assert_eq!(piece.cells, expected);
        }
    }

    #[test]
    fn test_table_mismatch_is_rejected() {
        let shapes = catalogue(&[DOMINO]);
        let table = PlacementTable::build(&shapes, 2, 2);
        let config = SolverConfig::default();
        assert!(matches!(
            Solver::new(&table, &Region::new(3, 2, vec![3]), &config),
            Err(PackError::SizeMismatch { .. })
        ));
        assert!(matches!(
            Solver::new(&table, &Region::new(2, 2, vec![1, 1]), &config),
            Err(PackError::CountMismatch { .. })
        ));
    }
}
