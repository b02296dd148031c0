//! Error types for well path loading and processing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the `wellpath` crate.
#[derive(Error, Debug)]
pub enum WellError {
    /// Survey measured depth does not strictly increase.
    #[error("malformed path: measured depth {next} at row {row} does not exceed previous depth {prev}")]
    MalformedPath { row: usize, prev: f64, next: f64 },

    /// Pixel buffer does not match the declared texture size.
    #[error("texture data holds {len} bytes but {width}x{height} RGBA needs {expected}")]
    TextureDimensions {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },

    /// Structurally invalid input (unsorted knots, unparsable numbers, ...).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A data file could not be read.
    #[error("failed to load {}: {source}", path.display())]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to parse CSV data.
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl WellError {
    /// True for errors caused by the content of the data rather than by
    /// access to it.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            WellError::MalformedPath { .. }
                | WellError::TextureDimensions { .. }
                | WellError::MalformedInput(_)
                | WellError::Csv(_)
        )
    }

    pub(crate) fn asset(path: impl Into<PathBuf>, source: io::Error) -> Self {
        WellError::AssetLoad {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, WellError>;
