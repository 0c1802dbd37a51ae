//! Output file naming and per-bucket persistence.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use serde::Serialize;

use super::AtomicCsvWriter;
use crate::error::AppError;

/// A fully written output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    /// Data rows in the file, header excluded.
    pub rows: u64,
}

/// Makes a key value safe for use in a file name.
///
/// Only `@` and `.` are replaced, so `a@b.com` and `a.b@com` both become
/// `a_b_com` and the later file overwrites the earlier one.
pub fn sanitize_key(key: &str) -> String {
    key.replace(['@', '.'], "_")
}

/// File name for a keyed bucket: `<sanitized key><suffix>.csv`.
pub fn key_file_name(key: &str, suffix: &str) -> String {
    format!("{}{}.csv", sanitize_key(key), suffix)
}

/// File name for a chunk: `<stem>_part_<sequence>.csv`.
pub fn chunk_file_name(stem: &str, sequence: u32) -> String {
    format!("{}_part_{}.csv", stem, sequence)
}

/// Base name of `input` without its extension, used to name chunks.
pub fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Writes `header` followed by `records` to `path`, atomically.
pub fn write_bucket(
    path: &Path,
    header: &StringRecord,
    records: &[StringRecord],
) -> Result<WrittenFile, AppError> {
    let mut writer = AtomicCsvWriter::new(path)?;
    writer.write_header(header)?;
    for record in records {
        writer.write_record(record)?;
    }
    let rows = writer.rows();
    let path = writer.finish()?;

    #[cfg(debug_assertions)]
    tracing::debug!(path = %path.display(), rows, "Wrote bucket");

    Ok(WrittenFile { path, rows })
}
