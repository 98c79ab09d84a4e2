//! Container cells, occupancy masks and realized packings.
//!
//! Cells of a `width x height` container are numbered row-major:
//! `idx = row * width + col`. A [`CellMask`] holds one bit per cell and is
//! used both for placements and for the live occupancy of a search state.

use bitvec::prelude::*;

use crate::pieces::Cell;

/// Converts `(row, col)` to a linear cell index.
#[inline(always)]
pub const fn coord_to_idx(width: usize, row: usize, col: usize) -> usize {
    row * width + col
}

/// Converts a linear cell index to `(row, col)`.
#[inline(always)]
pub const fn idx_to_coord(width: usize, cell_index: usize) -> (usize, usize) {
    (cell_index / width, cell_index % width)
}

/// A fixed-length bit set over container cells.
///
/// Bit `i` is set when cell `i` is covered. Length is fixed at creation and
/// the tail of the last word is always zero, so word-level operations never
/// see stray bits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellMask {
    bits: BitVec<u64, Lsb0>,
}

impl CellMask {
    /// An all-empty mask over `cells` cells.
    pub fn empty(cells: usize) -> Self {
        Self {
            bits: BitVec::repeat(false, cells),
        }
    }

    /// A mask with exactly the given cell indices set.
    pub fn from_indices(cells: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = Self::empty(cells);
        for index in indices {
            mask.insert(index);
        }
        mask
    }

    /// Number of cells the mask ranges over.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[inline]
    pub fn insert(&mut self, index: usize) {
        self.bits.set(index, true);
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.bits.get(index).is_some_and(|bit| *bit)
    }

    /// Number of set cells.
    #[inline]
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// True when every cell is set.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.bits.all()
    }

    /// True when the two masks share at least one cell.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.bits
            .as_raw_slice()
            .iter()
            .zip(other.bits.as_raw_slice())
            .any(|(a, b)| a & b != 0)
    }

    /// Sets every cell of `other` in `self`.
    #[inline]
    pub fn union_with(&mut self, other: &Self) {
        for (a, b) in self
            .bits
            .as_raw_mut_slice()
            .iter_mut()
            .zip(other.bits.as_raw_slice())
        {
            *a |= *b;
        }
    }

    /// A copy of `self` with the cells of `other` added.
    #[inline]
    pub fn with(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.union_with(other);
        merged
    }

    /// Indices of set cells, ascending.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Indices of unset cells, ascending.
    pub fn zeros(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_zeros()
    }
}

/// One piece as it was placed in a solved region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedPiece {
    /// Catalogue position of the shape.
    pub shape_index: usize,
    /// Index into the shape's orientation list.
    pub orientation: usize,
    /// Absolute `(row, col)` of the orientation's bounding-box corner.
    pub origin: (usize, usize),
    /// Absolute `(row, col)` cells, ascending.
    pub cells: Vec<Cell>,
}

/// A realized packing: which shape covers each container cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packing {
    pub width: usize,
    pub height: usize,
    /// Catalogue index per cell, row-major; `None` for an uncovered cell.
    pub cells: Vec<Option<usize>>,
    /// Pieces in the order the search placed them.
    pub pieces: Vec<PlacedPiece>,
}

impl Packing {
    /// Builds the cell map from a list of placed pieces.
    pub fn from_pieces(width: usize, height: usize, pieces: Vec<PlacedPiece>) -> Self {
        let mut cells = vec![None; width * height];
        for piece in &pieces {
            for &(r, c) in &piece.cells {
                cells[coord_to_idx(width, r as usize, c as usize)] = Some(piece.shape_index);
            }
        }
        Self {
            width,
            height,
            cells,
            pieces,
        }
    }

    /// Shape index at `(row, col)`, if covered.
    pub fn at(&self, row: usize, col: usize) -> Option<usize> {
        self.cells
            .get(coord_to_idx(self.width, row, col))
            .copied()
            .flatten()
    }

    /// Number of covered cells.
    pub fn covered(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Renders the packing one row per line.
    ///
    /// Each piece gets its own letter (`A`, `B`, ... in placement order,
    /// wrapping after `Z` to `a`..`z` and then repeating), so adjacent copies
    /// of the same shape stay distinguishable. Empty cells show as `.`.
    pub fn render(&self) -> String {
        let mut labels = vec!['.'; self.width * self.height];
        for (piece_number, piece) in self.pieces.iter().enumerate() {
            let label = piece_label(piece_number);
            for &(r, c) in &piece.cells {
                labels[coord_to_idx(self.width, r as usize, c as usize)] = label;
            }
        }

        let mut output = String::with_capacity((self.width + 1) * self.height);
        for row in labels.chunks(self.width) {
            output.extend(row.iter());
            output.push('\n');
        }
        output
    }

    /// Renders the catalogue index of each cell instead of a per-piece label.
    pub fn render_shapes(&self) -> String {
        let mut output = String::new();
        for row in self.cells.chunks(self.width) {
            for cell in row {
                match cell {
                    Some(index) if *index < 36 => output.push(
                        char::from_digit(*index as u32, 36)
                            .unwrap_or('?')
                            .to_ascii_uppercase(),
                    ),
                    Some(_) => output.push('?'),
                    None => output.push('.'),
                }
            }
            output.push('\n');
        }
        output
    }
}

fn piece_label(piece_number: usize) -> char {
    const LABELS: &[u8; 52] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    char::from(LABELS[piece_number % LABELS.len()])
}

/// Renders normalized cells as a small `#`/`.` picture.
pub fn format_cells(cells: &[Cell]) -> String {
    let (rows, cols) = crate::geometry::bounding_box(cells);
    let mut output = String::new();
    for r in 0..rows {
        for c in 0..cols {
            let filled = cells.contains(&(r as i32, c as i32));
            output.push(if filled { '#' } else { '.' });
        }
        output.push('\n');
    }
    output
}

/// Renders several orientations side by side, separated by two spaces.
pub fn format_orientations(orientations: &[Vec<Cell>]) -> String {
    let pictures: Vec<Vec<String>> = orientations
        .iter()
        .map(|cells| format_cells(cells).lines().map(str::to_owned).collect())
        .collect();
    let rows = pictures.iter().map(Vec::len).max().unwrap_or(0);

    let mut output = String::new();
    for r in 0..rows {
        let mut line = String::new();
        for (i, picture) in pictures.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            let width = picture.first().map_or(0, String::len);
            line.push_str(&format!(
                "{:<width$}",
                picture.get(r).map_or("", String::as_str),
                width = width
            ));
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_conversion_roundtrip() {
        for width in 1..6 {
            for idx in 0..width * 4 {
                let (row, col) = idx_to_coord(width, idx);
                assert!(col < width);
                assert_eq!(coord_to_idx(width, row, col), idx);
            }
        }
    }

    #[test]
    fn test_mask_set_operations() {
        let a = CellMask::from_indices(130, [0, 64, 129]);
        let b = CellMask::from_indices(130, [1, 65, 128]);
        let c = CellMask::from_indices(130, [129]);

        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));

        let merged = a.with(&b);
        assert_eq!(merged.count(), 6);
        assert_eq!(merged.ones().collect::<Vec<_>>(), vec![0, 1, 64, 65, 128, 129]);
        assert_eq!(merged.zeros().count(), 124);
        assert!(merged.contains(65));
        assert!(!merged.contains(66));
        assert!(!merged.contains(500));
    }

    #[test]
    fn test_mask_full() {
        let mut mask = CellMask::empty(3);
        assert!(!mask.is_full());
        mask.union_with(&CellMask::from_indices(3, [0, 1, 2]));
        assert!(mask.is_full());
        assert_eq!(mask.len(), 3);
    }

    #[test]
    fn test_packing_render() {
        let packing = Packing::from_pieces(
            3,
            2,
            vec![
                PlacedPiece {
                    shape_index: 0,
                    orientation: 1,
                    origin: (0, 0),
                    cells: vec![(0, 0), (1, 0)],
                },
                PlacedPiece {
                    shape_index: 1,
                    orientation: 0,
                    origin: (0, 1),
                    cells: vec![(0, 1), (0, 2), (1, 1)],
                },
            ],
        );

        insta::assert_snapshot!(packing.render().trim_end(), @r"
        ABB
        AB.
        ");
        assert_eq!(packing.covered(), 5);
        assert_eq!(packing.at(1, 1), Some(1));
        assert_eq!(packing.at(1, 2), None);
        assert_eq!(packing.render_shapes(), "011\n01.\n");
    }

    #[test]
    fn test_format_orientations() {
        let orientations = vec![vec![(0, 0), (0, 1)], vec![(0, 0), (1, 0)]];
        assert_eq!(format_orientations(&orientations), "##  #\n    #\n");
    }
}
