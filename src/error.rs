//! Error types for the coefficient-to-NetCDF conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// A numeric field on a data or log line did not parse.
    #[error("line {line}: cannot parse {field} from '{text}'")]
    Format {
        line: usize,
        field: &'static str,
        text: String,
    },

    /// A time marker whose date text does not match its format.
    #[error("line {line}: bad time marker '{text}'")]
    TimeMarker { line: usize, text: String },

    /// A required input path is missing or is not a regular file.
    #[error("cannot read input file {0}")]
    MissingInput(PathBuf),

    /// Reorder found a cell the gap filler never materialised.
    #[error("grid cell (time {time}, level {level}, radius {radius}) is empty; fill the grid before reordering")]
    SparseCell {
        time: usize,
        level: usize,
        radius: usize,
    },

    /// A track series length disagrees with the time axis under the strict policy.
    #[error("track series '{series}' has {found} entries, time axis has {expected}")]
    TrackMismatch {
        series: &'static str,
        expected: usize,
        found: usize,
    },

    /// A coefficient name that would clash with, or be rejected by, the output file.
    #[error("line {line}: coefficient name '{name}' {reason}")]
    InvalidName {
        line: usize,
        name: String,
        reason: &'static str,
    },

    /// A debug slice request that is not `coeff,time,level`.
    #[error("invalid slice '{0}', expected <coeff>,<time index>,<level index>")]
    SliceQuery(String),

    #[error("no variable '{0}' in file")]
    MissingVariable(String),

    #[error("variable '{name}' has shape {shape:?}, expected [radii, levels, times]")]
    BadShape { name: String, shape: Vec<usize> },

    #[error("{axis} index {index} out of range (length {len})")]
    OutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
