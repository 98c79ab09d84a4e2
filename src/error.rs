//! Error types for catalogue validation, parsing and bounded searches.

use std::path::PathBuf;

use thiserror::Error;

use crate::solver::Exhausted;

/// Everything that can go wrong before (or instead of) a packing answer.
///
/// An infeasible region is not an error: it is reported as
/// [`Outcome::Infeasible`](crate::solver::Outcome::Infeasible).
#[derive(Debug, Error)]
pub enum PackError {
    #[error("shape {id} has no cells")]
    EmptyShape { id: usize },

    #[error("region {width}x{height} has no cells")]
    EmptyRegion { width: usize, height: usize },

    #[error("region {width}x{height} lists {given} counts but the catalogue has {expected} shapes")]
    CountMismatch {
        width: usize,
        height: usize,
        given: usize,
        expected: usize,
    },

    #[error("region {width}x{height} exceeds the supported maximum of {max} cells")]
    RegionTooLarge {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("placement table is for a {}x{} container, region is {}x{}", .expected.0, .expected.1, .found.0, .found.1)]
    SizeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("search stopped before reaching an answer ({0})")]
    Inconclusive(Exhausted),

    #[error("could not read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, PackError>;
