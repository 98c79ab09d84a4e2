//! Precomputed placements of every shape in a fixed container.
//!
//! Placements are purely geometric: no overlap check happens here, so one
//! table serves every search state of every region with the same size.

use crate::geometry::bounding_box;
use crate::grid::{coord_to_idx, idx_to_coord, CellMask};
use crate::pieces::{Cell, Shape};

/// Enumerates every in-bounds position of each orientation.
///
/// Returns one list of masks per orientation, in the same order as
/// `orientations`. Offsets are visited row-major, so masks within a list are
/// ordered by their top-left corner. Orientations larger than the container
/// get an empty list.
pub fn generate_placements(
    orientations: &[Vec<Cell>],
    width: usize,
    height: usize,
) -> Vec<Vec<CellMask>> {
    let cells = width * height;

    orientations
        .iter()
        .map(|orientation| {
            let (shape_height, shape_width) = bounding_box(orientation);
            if shape_height > height || shape_width > width {
                return Vec::new();
            }

            let offsets = (height - shape_height + 1) * (width - shape_width + 1);
            let mut masks = Vec::with_capacity(offsets);
            for start_r in 0..=height - shape_height {
                for start_c in 0..=width - shape_width {
                    masks.push(CellMask::from_indices(
                        cells,
                        orientation.iter().map(|&(dr, dc)| {
                            coord_to_idx(width, start_r + dr as usize, start_c + dc as usize)
                        }),
                    ));
                }
            }
            masks
        })
        .collect()
}

/// Cells in the first or last row or column of a `width x height` container.
pub fn border_mask(width: usize, height: usize) -> CellMask {
    CellMask::from_indices(
        width * height,
        (0..width * height).filter(|&cell| {
            let (r, c) = idx_to_coord(width, cell);
            r == 0 || c == 0 || r + 1 == height || c + 1 == width
        }),
    )
}

/// One orientation of one shape at one offset.
#[derive(Clone, Debug)]
pub struct Placement {
    /// Cells covered by this placement.
    pub mask: CellMask,
    /// Index into the shape's orientation list.
    pub orientation: usize,
    /// Absolute `(row, col)` of the orientation's bounding-box corner.
    pub origin: (usize, usize),
}

/// All placements of one shape.
#[derive(Clone, Debug)]
pub struct ShapePlacements {
    /// Number of cells in the shape.
    pub size: usize,
    /// Flattened placements, orientation-major.
    pub placements: Vec<Placement>,
    /// `covering[cell]` lists indices into `placements` that cover `cell`,
    /// ascending (so still orientation-major).
    pub covering: Vec<Vec<u32>>,
}

impl ShapePlacements {
    /// Builds the placements of one shape from its orientations.
    pub fn build(orientations: &[Vec<Cell>], size: usize, width: usize, height: usize) -> Self {
        let per_orientation = generate_placements(orientations, width, height);

        let mut placements = Vec::new();
        for (orientation, masks) in per_orientation.into_iter().enumerate() {
            let (_, shape_width) = bounding_box(&orientations[orientation]);
            let columns = width + 1 - shape_width.min(width);
            for (offset, mask) in masks.into_iter().enumerate() {
                placements.push(Placement {
                    mask,
                    orientation,
                    origin: (offset / columns, offset % columns),
                });
            }
        }

        Self::from_placements(size, placements, width * height)
    }

    fn from_placements(size: usize, placements: Vec<Placement>, cells: usize) -> Self {
        let mut covering = vec![Vec::new(); cells];
        for (index, placement) in placements.iter().enumerate() {
            for cell in placement.mask.ones() {
                covering[cell].push(index as u32);
            }
        }

        Self {
            size,
            placements,
            covering,
        }
    }

    /// Keeps only the placements with at least one cell on the container edge.
    pub fn touching_border(&self, width: usize, height: usize) -> Self {
        let border = border_mask(width, height);
        let placements = self
            .placements
            .iter()
            .filter(|placement| placement.mask.intersects(&border))
            .cloned()
            .collect();
        Self::from_placements(self.size, placements, width * height)
    }

    /// Placements that cover `cell`.
    #[inline]
    pub fn covering(&self, cell: usize) -> impl Iterator<Item = &Placement> + '_ {
        self.covering[cell]
            .iter()
            .map(move |&index| &self.placements[index as usize])
    }
}

/// Placement tables for a whole catalogue in one container size.
///
/// Immutable once built; share it between regions of the same size.
#[derive(Clone, Debug)]
pub struct PlacementTable {
    pub width: usize,
    pub height: usize,
    /// Distinct orientations per shape, catalogue order.
    pub orientations: Vec<Vec<Vec<Cell>>>,
    /// Placements per shape, catalogue order.
    pub shapes: Vec<ShapePlacements>,
}

impl PlacementTable {
    /// Builds placements of every shape for a `width x height` container.
    pub fn build(shapes: &[Shape], width: usize, height: usize) -> Self {
        let orientations: Vec<Vec<Vec<Cell>>> = shapes.iter().map(Shape::orientations).collect();
        let shape_placements = orientations
            .iter()
            .zip(shapes)
            .map(|(orientations, shape)| {
                ShapePlacements::build(orientations, shape.size(), width, height)
            })
            .collect();

        Self {
            width,
            height,
            orientations,
            shapes: shape_placements,
        }
    }

    /// Number of container cells.
    #[inline]
    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    /// Total placements across all shapes.
    pub fn placement_count(&self) -> usize {
        self.shapes.iter().map(|shape| shape.placements.len()).sum()
    }
}
