//! Output handler trait and errors
//!
//! An output handler is the boundary where a finished [`Dataset`] leaves the
//! crate. The CSV handler is the one the binary uses.

use crate::output::Dataset;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for writing a finished dataset somewhere
pub trait OutputHandler {
    /// Writes every row of `dataset`
    fn write_dataset(&mut self, dataset: &Dataset) -> OutputResult<()>;

    /// Flushes pending output
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
