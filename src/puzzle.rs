//! Text puzzle format.
//!
//! ```text
//! 0:
//! ###
//! ##.
//! ##.
//!
//! 1:
//! .#.
//! ###
//!
//! 4x4: 1 2
//! 12x5: 0 3
//! ```
//!
//! A shape block is an `<id>:` header followed by rows of `#` (filled) and
//! `.` (empty); a blank line or the next header ends it. A region line is
//! `<width>x<height>:` followed by one count per shape, in id order. Shape
//! ids must be exactly `0..n`, in any order.

use std::fs;
use std::path::Path;

use crate::error::{PackError, Result};
use crate::pieces::{Region, Shape};

/// A parsed puzzle file: a shape catalogue and the regions to pack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    /// Shapes ordered by id, so `shapes[i].id == i`.
    pub shapes: Vec<Shape>,
    pub regions: Vec<Region>,
}

impl Puzzle {
    /// Reads and parses a puzzle file.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Io`] if the file cannot be read, or a parse error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let input = fs::read_to_string(path).map_err(|source| PackError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&input)
    }

    /// Parses puzzle text.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::Parse`] with a 1-based line number for any line
    /// that is neither a shape header, a shape row nor a region line, and
    /// for duplicate or non-contiguous shape ids. Empty shapes are reported
    /// as [`PackError::EmptyShape`].
    pub fn parse(input: &str) -> Result<Self> {
        let mut shapes: Vec<(usize, Shape)> = Vec::new();
        let mut regions = Vec::new();
        let mut lines = input.lines().enumerate().peekable();

        while let Some((index, raw)) = lines.next() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(id) = parse_shape_header(line) {
                let mut cells = Vec::new();
                let mut row = 0;
                while let Some(&(_, row_line)) = lines.peek() {
                    let row_line = row_line.trim();
                    if row_line.is_empty() || !row_line.chars().all(|ch| ch == '#' || ch == '.') {
                        break;
                    }
                    lines.next();
                    cells.extend(
                        row_line
                            .char_indices()
                            .filter(|&(_, ch)| ch == '#')
                            .map(|(col, _)| (row, col as i32)),
                    );
                    row += 1;
                }

                if shapes.iter().any(|(_, shape)| shape.id == id) {
                    return Err(parse_error(line_number, format!("duplicate shape id {id}")));
                }
                shapes.push((line_number, Shape::new(id, cells)?));
                continue;
            }

            match parse_region(line) {
                Some(Ok(region)) => regions.push(region),
                Some(Err(reason)) => return Err(parse_error(line_number, reason)),
                None => {
                    return Err(parse_error(
                        line_number,
                        format!("expected a shape header or a region line, got '{line}'"),
                    ))
                }
            }
        }

        shapes.sort_by_key(|(_, shape)| shape.id);
        if let Some((line_number, shape)) = shapes
            .iter()
            .enumerate()
            .find(|(position, (_, shape))| shape.id != *position)
            .map(|(_, entry)| entry)
        {
            return Err(parse_error(
                *line_number,
                format!("shape ids must be 0..{}, found {}", shapes.len(), shape.id),
            ));
        }

        Ok(Self {
            shapes: shapes.into_iter().map(|(_, shape)| shape).collect(),
            regions,
        })
    }
}

fn parse_error(line: usize, reason: String) -> PackError {
    PackError::Parse { line, reason }
}

/// `"<id>:"` with nothing after the colon.
fn parse_shape_header(line: &str) -> Option<usize> {
    let id = line.strip_suffix(':')?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

/// `None` if the line does not look like a region at all, `Some(Err)` if it
/// does but a number is malformed.
fn parse_region(line: &str) -> Option<std::result::Result<Region, String>> {
    let (size, counts) = line.split_once(':')?;
    let (width, height) = size.trim().split_once('x')?;

    Some(region_from_parts(width, height, counts))
}

fn region_from_parts(
    width: &str,
    height: &str,
    counts: &str,
) -> std::result::Result<Region, String> {
    let width = parse_number(width)?;
    let height = parse_number(height)?;
    let counts = counts
        .split_whitespace()
        .map(parse_number::<u32>)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Region::new(width, height, counts))
}

fn parse_number<T>(text: &str) -> std::result::Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let text = text.trim();
    text.parse().map_err(|err| format!("bad number '{text}': {err}"))
}
