//! CSV output of the harvested dataset
//!
//! The file has the header `Title,URL,found_link` and one UTF-8 record per row.

use crate::output::traits::{OutputHandler, OutputResult};
use crate::output::Dataset;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column names of the CSV output
pub const CSV_HEADER: [&str; 3] = ["Title", "URL", "found_link"];

/// Writes `dataset` as CSV to any writer
///
/// The header is written even when the dataset is empty.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> OutputResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for row in dataset {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;

    Ok(())
}

impl Dataset {
    /// Writes the dataset as CSV to `writer`
    pub fn write_csv<W: Write>(&self, writer: W) -> OutputResult<()> {
        write_csv(self, writer)
    }
}

/// Output handler writing the dataset to a CSV file
#[derive(Debug)]
pub struct CsvOutputHandler {
    path: PathBuf,
}

impl CsvOutputHandler {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputHandler for CsvOutputHandler {
    fn write_dataset(&mut self, dataset: &Dataset) -> OutputResult<()> {
        let file = File::create(&self.path)?;
        dataset.write_csv(file)?;
        tracing::info!(
            "Wrote {} rows to {}",
            dataset.len(),
            self.path.display()
        );
        Ok(())
    }
}
