//! Polyomino Packing Library
//!
//! Decides whether a multiset of polyomino pieces, each usable in any
//! rotation or reflection, can be packed into a rectangular region, and
//! returns one packing when it can.
//!
//! ```
//! use polypack::pieces::{catalogue, Region, Shape};
//!
//! let shapes = vec![Shape::new(0, catalogue::DOMINO.iter().copied()).unwrap()];
//! assert!(polypack::solve(&shapes, &Region::new(2, 2, vec![2])).unwrap());
//! assert!(!polypack::solve(&shapes, &Region::new(3, 3, vec![4])).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod hasher;
pub mod memo;
pub mod pieces;
pub mod placement;
pub mod puzzle;
pub mod solver;

use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

pub use config::{Coverage, MemoMode, SolverConfig};
pub use error::{PackError, Result};
pub use grid::Packing;
pub use pieces::{Region, Shape};
pub use placement::PlacementTable;
pub use solver::{Exhausted, Outcome, Solver};

/// Whether the required pieces fit by area alone, ignoring geometry.
///
/// A necessary condition for any packing; cheap enough to run on every
/// region before searching.
pub fn area_fits(shapes: &[Shape], region: &Region) -> bool {
    region.required_area(shapes) <= region.area()
}

/// Decides whether `region` can be exactly tiled by its required pieces.
///
/// # Errors
///
/// Returns a data error for a malformed catalogue or region. The default
/// configuration has no budget, so [`PackError::Inconclusive`] cannot occur.
pub fn solve(shapes: &[Shape], region: &Region) -> Result<bool> {
    solve_region(shapes, region, &SolverConfig::default())?.into_bool()
}

/// Solves one region, returning the full outcome.
///
/// # Errors
///
/// Returns a data error for a malformed catalogue or region.
pub fn solve_region(shapes: &[Shape], region: &Region, config: &SolverConfig) -> Result<Outcome> {
    pieces::validate_catalogue(shapes)?;
    region.validate(shapes)?;

    let table = PlacementTable::build(shapes, region.width, region.height);
    let mut solver = Solver::new(&table, region, config)?;
    Ok(solver.run())
}

/// Solves many regions in parallel.
///
/// All inputs are validated before any search starts. Regions of the same
/// size share one read-only placement table; each region gets its own memo
/// table and hasher. Outcomes are returned in input order.
///
/// # Errors
///
/// Returns the first data error found in the catalogue or regions.
pub fn solve_all(
    shapes: &[Shape],
    regions: &[Region],
    config: &SolverConfig,
) -> Result<Vec<Outcome>> {
    pieces::validate_catalogue(shapes)?;
    for region in regions {
        region.validate(shapes)?;
    }

    let mut tables: FxHashMap<(usize, usize), PlacementTable> = FxHashMap::default();
    for region in regions {
        tables
            .entry((region.width, region.height))
            .or_insert_with(|| PlacementTable::build(shapes, region.width, region.height));
    }
    debug!(
        "solving {} regions with {} placement tables",
        regions.len(),
        tables.len()
    );

    regions
        .par_iter()
        .map(|region| -> Result<Outcome> {
            let table = &tables[&(region.width, region.height)];
            let mut solver = Solver::new(table, region, config)?;
            Ok(solver.run())
        })
        .collect()
}
