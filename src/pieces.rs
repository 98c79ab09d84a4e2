//! Piece and region definitions.
//!
//! A shape is a set of unit cells in a local `(row, col)` frame, normalized so
//! the minimum row and column are zero. A region is a rectangular container
//! plus the number of copies of each catalogue shape that must go into it.

use crate::error::{PackError, Result};
use crate::geometry::{all_orientations, normalize_to_origin};

/// A `(row, col)` cell coordinate.
///
/// Signed so that rotations and reflections can leave the first quadrant
/// before being normalized back.
pub type Cell = (i32, i32);

/// Largest container the solver accepts.
///
/// Counts are decremented in `u32` and cell indices are stored as `u32` in
/// the covering tables, so anything beyond this is rejected up front.
pub const MAX_REGION_CELLS: usize = 1 << 20;

/// One piece of the catalogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    /// Label from the input; catalogue position is what regions index by.
    pub id: usize,
    cells: Vec<Cell>,
}

impl Shape {
    /// Creates a shape from arbitrary cells, normalizing them to the origin.
    ///
    /// Duplicated cells are collapsed.
    pub fn new(id: usize, cells: impl IntoIterator<Item = Cell>) -> Result<Self> {
        let mut cells: Vec<Cell> = cells.into_iter().collect();
        if cells.is_empty() {
            return Err(PackError::EmptyShape { id });
        }
        cells.sort_unstable();
        cells.dedup();

        Ok(Self {
            id,
            cells: normalize_to_origin(cells),
        })
    }

    /// The normalized cells, sorted.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells covered by one copy of this shape.
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// All distinct rotations and reflections of this shape.
    pub fn orientations(&self) -> Vec<Vec<Cell>> {
        all_orientations(&self.cells)
    }
}

/// A rectangular container and the pieces required inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub width: usize,
    pub height: usize,
    /// Required copies of each shape, indexed by catalogue position.
    pub counts: Vec<u32>,
}

impl Region {
    pub fn new(width: usize, height: usize, counts: Vec<u32>) -> Self {
        Self {
            width,
            height,
            counts,
        }
    }

    /// Number of cells in the container.
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Total cells the required pieces cover.
    pub fn required_area(&self, shapes: &[Shape]) -> usize {
        self.counts
            .iter()
            .zip(shapes)
            .map(|(&count, shape)| (count as usize).saturating_mul(shape.size()))
            .fold(0, usize::saturating_add)
    }

    /// Checks the region against the catalogue it will be solved with.
    ///
    /// # Errors
    ///
    /// Returns a data error for an empty container, an oversized container,
    /// or a count vector whose length differs from the catalogue.
    pub fn validate(&self, shapes: &[Shape]) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PackError::EmptyRegion {
                width: self.width,
                height: self.height,
            });
        }
        if self.width.saturating_mul(self.height) > MAX_REGION_CELLS {
            return Err(PackError::RegionTooLarge {
                width: self.width,
                height: self.height,
                max: MAX_REGION_CELLS,
            });
        }
        if self.counts.len() != shapes.len() {
            return Err(PackError::CountMismatch {
                width: self.width,
                height: self.height,
                given: self.counts.len(),
                expected: shapes.len(),
            });
        }
        Ok(())
    }
}

/// Validates a catalogue of shapes.
///
/// `Shape::new` already refuses empty shapes; this catches shapes built by
/// other means (for example deserialized or cloned and mutated in tests).
pub fn validate_catalogue(shapes: &[Shape]) -> Result<()> {
    match shapes.iter().find(|shape| shape.cells.is_empty()) {
        Some(shape) => Err(PackError::EmptyShape { id: shape.id }),
        None => Ok(()),
    }
}

/// Common pieces, handy for tests and benchmarks.
pub mod catalogue {
    use super::Cell;

    /// A single cell.
    pub const MONOMINO: &[Cell] = &[(0, 0)];
    /// Two cells side by side.
    pub const DOMINO: &[Cell] = &[(0, 0), (0, 1)];
    /// Three cells bent into an L.
    pub const L_TROMINO: &[Cell] = &[(0, 0), (1, 0), (1, 1)];
    /// The 2x2 square.
    pub const O_TETROMINO: &[Cell] = &[(0, 0), (0, 1), (1, 0), (1, 1)];
    /// The chiral L tetromino.
    pub const L_TETROMINO: &[Cell] = &[(0, 0), (1, 0), (2, 0), (2, 1)];
    /// The T tetromino.
    pub const T_TETROMINO: &[Cell] = &[(0, 0), (0, 1), (0, 2), (1, 1)];
    /// The S tetromino.
    pub const S_TETROMINO: &[Cell] = &[(0, 1), (0, 2), (1, 0), (1, 1)];
    /// The F pentomino, which has no symmetry at all.
    pub const F_PENTOMINO: &[Cell] = &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)];
}
