//! Rotation and reflection utilities for planar pieces.
//!
//! A square has 8 symmetries (the dihedral group of order 8): the 4 quarter
//! turns of the piece as given, and the 4 quarter turns of its mirror image.

use crate::pieces::Cell;

/// All 8 symmetries of the square, as maps on `(row, col)`.
///
/// - Transforms 0-3: repeated clockwise quarter turn `(r, c) -> (c, -r)`
/// - Transforms 4-7: mirror `(r, c) -> (r, -c)` followed by the same turns
pub const TRANSFORMS: [fn(Cell) -> Cell; 8] = [
    |(r, c)| (r, c),   // 0 degrees
    |(r, c)| (c, -r),  // 90 degrees
    |(r, c)| (-r, -c), // 180 degrees
    |(r, c)| (-c, r),  // 270 degrees
    // mirrored
    |(r, c)| (r, -c),
    |(r, c)| (-c, -r),
    |(r, c)| (-r, c),
    |(r, c)| (c, r),
];

/// Generates all distinct orientations of a piece.
///
/// Applies every transform, normalizes each result to the origin, then drops
/// duplicates; symmetric pieces collapse to fewer than 8 orientations. The
/// result is sorted, so it does not depend on how the input cells were ordered.
pub fn all_orientations(piece: &[Cell]) -> Vec<Vec<Cell>> {
    let mut orientations: Vec<Vec<Cell>> = TRANSFORMS
        .iter()
        .map(|transform| normalize_to_origin(piece.iter().map(|&cell| transform(cell)).collect()))
        .collect();

    orientations.sort();
    orientations.dedup();
    orientations
}

/// Translates cells so the minimum row and column are zero, then sorts them.
///
/// Sorting makes two placements of the same footprint compare equal no
/// matter which transform produced them.
pub fn normalize_to_origin(mut cells: Vec<Cell>) -> Vec<Cell> {
    let Some(min_row) = cells.iter().map(|&(r, _)| r).min() else {
        return cells;
    };
    let min_col = cells.iter().map(|&(_, c)| c).min().unwrap_or(0);

    for (r, c) in &mut cells {
        *r -= min_row;
        *c -= min_col;
    }

    cells.sort_unstable();
    cells
}

/// Height and width of the bounding box of normalized cells.
#[inline]
pub fn bounding_box(cells: &[Cell]) -> (usize, usize) {
    let rows = cells.iter().map(|&(r, _)| r + 1).max().unwrap_or(0);
    let cols = cells.iter().map(|&(_, c)| c + 1).max().unwrap_or(0);
    (rows as usize, cols as usize)
}
