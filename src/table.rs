//! In-memory CSV table: the header plus every data row of one input file.
//!
//! Input files are read fully before any output is written, so the partition
//! pass and the write-out pass never overlap.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::AppError;

/// UTF-8 BOM as it appears once decoded.
const UTF8_BOM: char = '\u{feff}';

/// One input CSV: its header and data rows in file order.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub header: StringRecord,
    pub records: Vec<StringRecord>,
}

impl CsvTable {
    /// Reads the CSV file at `path`.
    ///
    /// # Errors
    ///
    /// - `AppError::InputNotFound` if `path` does not exist
    /// - `AppError::EmptyInput` if the file has no header row
    /// - `AppError::CsvInvalid` for malformed CSV
    pub fn read(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::InputNotFound(path.to_path_buf()),
            _ => AppError::Internal(format!("Failed to open {}: {}", path.display(), e)),
        })?;

        let table = Self::from_reader(BufReader::new(file))?;

        #[cfg(debug_assertions)]
        tracing::debug!(
            source = %path.display(),
            columns = table.header.len(),
            rows = table.records.len(),
            "Read input CSV"
        );

        Ok(table)
    }

    /// Reads a CSV table from any reader. A leading UTF-8 BOM is ignored.
    ///
    /// Rows may have more or fewer fields than the header; they are kept as-is.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: StringRecord = reader
            .headers()
            .map_err(|e| AppError::CsvInvalid(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .enumerate()
            .map(|(i, name)| if i == 0 { name.trim_start_matches(UTF8_BOM) } else { name })
            .collect();

        if header.is_empty() {
            return Err(AppError::EmptyInput);
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result
                .map_err(|e| AppError::CsvInvalid(format!("Failed to read CSV record: {}", e)))?;
            records.push(record);
        }

        Ok(Self { header, records })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_reads_header_and_rows_in_order() {
        let file = create_temp_csv(b"primaryEmail,summary\na@x.com,Standup\nb@x.com,Review\n");
        let table = CsvTable::read(file.path()).expect("read failed");

        assert_eq!(table.header.iter().collect::<Vec<_>>(), vec!["primaryEmail", "summary"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(&table.records[0][0], "a@x.com");
        assert_eq!(&table.records[1][1], "Review");
    }

    #[test]
    fn test_missing_file_is_input_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.csv");

        match CsvTable::read(&missing) {
            Err(AppError::InputNotFound(path)) => assert_eq!(path, missing),
            other => panic!("Expected InputNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_is_empty_input() {
        let file = create_temp_csv(b"");
        assert!(matches!(CsvTable::read(file.path()), Err(AppError::EmptyInput)));
    }

    #[test]
    fn test_header_only_has_no_records() {
        let file = create_temp_csv(b"Id,Name\n");
        let table = CsvTable::read(file.path()).expect("read failed");
        assert!(table.is_empty());
        assert_eq!(table.header.len(), 2);
    }

    #[test]
    fn test_bom_is_stripped_from_first_column() {
        let file = create_temp_csv(b"\xEF\xBB\xBFprimaryEmail,summary\na@x.com,Standup\n");
        let table = CsvTable::read(file.path()).expect("read failed");
        assert_eq!(&table.header[0], "primaryEmail");
    }

    #[test]
    fn test_ragged_rows_are_kept_as_read() {
        let file = create_temp_csv(b"A,B\n1,2\n3,4,5\n6\n");
        let table = CsvTable::read(file.path()).expect("read failed");

        assert_eq!(table.records.len(), 3);
        assert_eq!(table.records[1].len(), 3);
        assert_eq!(table.records[2].len(), 1);
        assert_eq!(table.records[2].get(1), None);
    }

    #[test]
    fn test_invalid_utf8_is_csv_invalid() {
        let file = create_temp_csv(b"A,B\n1,\xFF\xFE\n");
        assert!(matches!(CsvTable::read(file.path()), Err(AppError::CsvInvalid(_))));
    }

    #[test]
    fn test_quoted_fields_survive() {
        let file = create_temp_csv(b"Name,Desc\n\"John\",\"Line1\nLine2, with comma\"\n");
        let table = CsvTable::read(file.path()).expect("read failed");
        assert_eq!(&table.records[0][1], "Line1\nLine2, with comma");
    }
}
