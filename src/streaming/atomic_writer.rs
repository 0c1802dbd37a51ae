//! Atomic CSV file writer with automatic cleanup on failure.
//!
//! Writes to a temporary file in the same directory as the destination,
//! then atomically replaces the destination on `finish()`. If dropped
//! before finishing, the temporary file is automatically cleaned up.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::{StringRecord, Terminator, Writer, WriterBuilder};
use tempfile::NamedTempFile;

use crate::error::AppError;

/// An atomic CSV writer that ensures data integrity.
///
/// Writes to a temporary file and atomically persists to the final path
/// on `finish()`. If dropped without calling `finish()`, the temporary
/// file is automatically deleted. An existing file at the final path is
/// replaced.
pub struct AtomicCsvWriter {
    writer: Writer<BufWriter<NamedTempFile>>,
    final_path: PathBuf,
    rows: u64,
}

impl AtomicCsvWriter {
    /// Creates a new atomic CSV writer targeting the specified path.
    ///
    /// The temporary file is created in the same directory as `final_path`
    /// to ensure atomic persistence (same filesystem requirement).
    ///
    /// # Errors
    ///
    /// Returns `AppError::WriteFailed` if the parent directory cannot be
    /// determined or the temporary file cannot be created.
    pub fn new(final_path: impl AsRef<Path>) -> Result<Self, AppError> {
        let final_path = final_path.as_ref().to_path_buf();

        let parent_dir = match final_path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
            Some(dir) => dir,
            None => {
                return Err(write_failed(
                    &final_path,
                    "Cannot determine parent directory",
                ))
            }
        };

        let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| {
            write_failed(&final_path, format!("Failed to create temporary file: {}", e))
        })?;

        let csv_writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .terminator(Terminator::CRLF)
            .from_writer(BufWriter::new(temp_file));

        Ok(Self {
            writer: csv_writer,
            final_path,
            rows: 0,
        })
    }

    /// Writes the header row. Not counted as a data row.
    pub fn write_header(&mut self, header: &StringRecord) -> Result<(), AppError> {
        self.writer
            .write_record(header)
            .map_err(|e| write_failed(&self.final_path, e))
    }

    /// Writes one data row.
    pub fn write_record(&mut self, record: &StringRecord) -> Result<(), AppError> {
        self.writer
            .write_record(record)
            .map_err(|e| write_failed(&self.final_path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flushes all buffers and atomically persists the file to the final path.
    ///
    /// This method consumes the writer. On success, the destination file
    /// is atomically replaced with the contents written to the temporary file.
    ///
    /// # Returns
    ///
    /// Returns the final path on success.
    ///
    /// # Errors
    ///
    /// Returns `AppError::WriteFailed` if flushing or persisting fails.
    /// On error, the temporary file is cleaned up automatically.
    pub fn finish(self) -> Result<PathBuf, AppError> {
        // Flush the CSV writer and get the BufWriter
        let buf_writer = self.writer.into_inner().map_err(|e| {
            write_failed(
                &self.final_path,
                format!("Failed to flush CSV writer: {}", e.error()),
            )
        })?;

        // Flush the BufWriter and get the NamedTempFile
        let named_temp = buf_writer.into_inner().map_err(|e| {
            write_failed(
                &self.final_path,
                format!("Failed to flush buffer: {}", e.error()),
            )
        })?;

        // Atomically persist to the final path
        named_temp.persist(&self.final_path).map_err(|e| {
            write_failed(&self.final_path, format!("Failed to persist file: {}", e.error))
        })?;

        Ok(self.final_path)
    }
}

fn write_failed(path: &Path, message: impl ToString) -> AppError {
    AppError::WriteFailed {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}
