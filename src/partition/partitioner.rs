//! `CsvPartitioner`: read, partition, write.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::Serialize;
use tracing::info;

use super::grouping::{group_by_key, RecencyFilter, SkipCounts};
use super::policy::{OutputConfig, Policy};
use crate::dates::EventTimeColumns;
use crate::error::AppError;
use crate::streaming::{
    chunk_file_name, chunk_records, input_stem, key_file_name, write_bucket, WrittenFile,
};
use crate::table::CsvTable;
use crate::validation::require_columns;

/// Identity of a bucket, which determines its output file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BucketName {
    /// Value of the key column.
    Key(String),
    /// 1-based chunk sequence number.
    Chunk(u32),
}

/// Rows destined for one output file.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub name: BucketName,
    pub records: Vec<StringRecord>,
}

/// Result of the partition pass, before anything is written.
#[derive(Debug, Clone)]
pub struct Partition {
    pub header: StringRecord,
    /// Buckets in write order.
    pub buckets: Vec<Bucket>,
    pub rows_read: u64,
    pub skipped: SkipCounts,
}

impl Partition {
    /// Total rows across all buckets.
    pub fn rows_assigned(&self) -> u64 {
        self.buckets.iter().map(|b| b.records.len() as u64).sum()
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub policy: &'static str,
    /// Present for the recency policy.
    pub cutoff: Option<NaiveDateTime>,
    pub files: Vec<WrittenFile>,
    pub rows_read: u64,
    pub rows_written: u64,
    pub skipped: SkipCounts,
}

/// Progress hooks for a run.
///
/// `on_partitioned` fires once between the partition pass and the write
/// pass; `on_written` fires after each output file has been persisted.
pub trait RunObserver {
    fn on_partitioned(&mut self, _partition: &Partition) {}

    fn on_written(&mut self, _file: &WrittenFile) {}
}

/// Observer that reports nothing.
pub struct Silent;

impl RunObserver for Silent {}

/// Partitions one CSV file according to a policy and writes the buckets.
#[derive(Debug, Clone)]
pub struct CsvPartitioner {
    policy: Policy,
    output: OutputConfig,
}

impl CsvPartitioner {
    pub fn new(policy: Policy, output: OutputConfig) -> Self {
        Self { policy, output }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Reads `input`, partitions it and writes every bucket.
    ///
    /// # Errors
    ///
    /// - `AppError::InputNotFound` / `AppError::EmptyInput` / `AppError::CsvInvalid`
    ///   from reading the input
    /// - `AppError::MissingColumns` before any row is processed
    /// - `AppError::EmptyInput` for chunking a file with no data rows
    /// - `AppError::WriteFailed` if an output file cannot be written; files
    ///   persisted before the failure remain and were already reported
    pub fn run(&self, input: &Path, observer: &mut impl RunObserver) -> Result<RunReport, AppError> {
        let table = CsvTable::read(input)?;
        let partition = self.partition(table)?;
        observer.on_partitioned(&partition);

        let files = self.write(&partition, input, observer)?;
        let rows_written: u64 = files.iter().map(|f| f.rows).sum();

        info!(
            input = %input.display(),
            policy = self.policy.name(),
            files = files.len(),
            rows_read = partition.rows_read,
            rows_written,
            skipped = partition.skipped.total(),
            "Partition run complete"
        );

        Ok(RunReport {
            input: input.to_path_buf(),
            policy: self.policy.name(),
            cutoff: match &self.policy {
                Policy::Recency(config) => Some(config.cutoff.at()),
                _ => None,
            },
            files,
            rows_read: partition.rows_read,
            rows_written,
            skipped: partition.skipped,
        })
    }

    /// Assigns the rows of `table` to buckets. Pure: touches no files.
    pub fn partition(&self, table: CsvTable) -> Result<Partition, AppError> {
        let columns = require_columns(&table.header, &self.policy.required_columns())?;
        if matches!(self.policy, Policy::Chunk(_)) && table.is_empty() {
            return Err(AppError::EmptyInput);
        }

        let rows_read = table.records.len() as u64;
        let CsvTable { header, records } = table;
        let column = |n: usize| {
            columns
                .get(n)
                .ok_or_else(|| AppError::Internal(format!("Required column {} not resolved", n)))
        };

        let (buckets, skipped) = match &self.policy {
            Policy::Recency(config) => {
                // required_columns order: key, date, date-time
                let filter = RecencyFilter {
                    columns: EventTimeColumns {
                        date_time: column(2)?,
                        date: column(1)?,
                    },
                    cutoff: config.cutoff,
                };
                let grouped = group_by_key(records, column(0)?, Some(&filter));
                (keyed_buckets(grouped.buckets), grouped.skipped)
            }
            Policy::Group(_) => {
                let grouped = group_by_key(records, column(0)?, None);
                (keyed_buckets(grouped.buckets), grouped.skipped)
            }
            Policy::Chunk(config) => {
                let buckets = chunk_records(records, config)
                    .into_iter()
                    .zip(1u32..)
                    .map(|(records, sequence)| Bucket {
                        name: BucketName::Chunk(sequence),
                        records,
                    })
                    .collect();
                (buckets, SkipCounts::default())
            }
        };

        let partition = Partition {
            header,
            buckets,
            rows_read,
            skipped,
        };

        tracing::debug!(
            policy = self.policy.name(),
            rows_read,
            rows_assigned = partition.rows_assigned(),
            buckets = partition.buckets.len(),
            skipped = partition.skipped.total(),
            "Partition pass complete"
        );

        Ok(partition)
    }

    /// Output path for a bucket of `input`.
    pub fn output_path(&self, name: &BucketName, input: &Path) -> PathBuf {
        let file_name = match (name, &self.policy) {
            (BucketName::Key(key), Policy::Recency(config)) => {
                key_file_name(key, &config.group.file_suffix)
            }
            (BucketName::Key(key), Policy::Group(config)) => key_file_name(key, &config.file_suffix),
            (BucketName::Key(key), Policy::Chunk(_)) => key_file_name(key, ""),
            (BucketName::Chunk(sequence), _) => chunk_file_name(&input_stem(input), *sequence),
        };
        self.output.dir.join(file_name)
    }

    /// Writes every bucket of `partition`, in order, reporting each file to
    /// `observer` as soon as it is persisted.
    pub fn write(
        &self,
        partition: &Partition,
        input: &Path,
        observer: &mut impl RunObserver,
    ) -> Result<Vec<WrittenFile>, AppError> {
        if partition.buckets.is_empty() {
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(&self.output.dir).map_err(|e| AppError::WriteFailed {
            path: self.output.dir.clone(),
            message: format!("Failed to create output directory: {}", e),
        })?;

        let mut files = Vec::with_capacity(partition.buckets.len());
        for bucket in &partition.buckets {
            let path = self.output_path(&bucket.name, input);
            let written = write_bucket(&path, &partition.header, &bucket.records)?;
            observer.on_written(&written);
            files.push(written);
        }

        Ok(files)
    }
}

fn keyed_buckets(buckets: indexmap::IndexMap<String, Vec<StringRecord>>) -> Vec<Bucket> {
    buckets
        .into_iter()
        .map(|(key, records)| Bucket {
            name: BucketName::Key(key),
            records,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::Cutoff;
    use crate::partition::{GroupConfig, RecencyConfig};
    use crate::streaming::ChunkConfig;
    use chrono::NaiveDate;

    fn table(header: &[&str], rows: &[&[&str]]) -> CsvTable {
        CsvTable {
            header: StringRecord::from(header.to_vec()),
            records: rows.iter().map(|r| StringRecord::from(r.to_vec())).collect(),
        }
    }

    fn cutoff() -> Cutoff {
        Cutoff::new(
            NaiveDate::from_ymd_opt(2024, 1, 10)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap(),
        )
    }

    fn partitioner(policy: Policy) -> CsvPartitioner {
        CsvPartitioner::new(policy, OutputConfig::new("out"))
    }

    #[test]
    fn test_recency_partition_resolves_columns_by_name() {
        // Column order differs from the required-column order
        let t = table(
            &["start.dateTime", "summary", "primaryEmail", "start.date"],
            &[
                &["2024-01-15T10:00:00+02:00", "kept", "a@x.com", ""],
                &["", "old", "a@x.com", "2023-12-01"],
                &["", "all-day", "b@x.com", "2024-01-10"],
            ],
        );
        let partition = partitioner(Policy::Recency(RecencyConfig::new(cutoff())))
            .partition(t)
            .expect("partition failed");

        let names: Vec<&BucketName> = partition.buckets.iter().map(|b| &b.name).collect();
        assert_eq!(
            names,
            vec![
                &BucketName::Key("a@x.com".into()),
                &BucketName::Key("b@x.com".into())
            ]
        );
        assert_eq!(partition.rows_read, 3);
        assert_eq!(partition.rows_assigned(), 2);
        assert_eq!(partition.skipped.before_cutoff, 1);
    }

    #[test]
    fn test_missing_key_column_fails_before_rows() {
        let t = table(&["email"], &[&["a@x.com"]]);
        let err = partitioner(Policy::Group(GroupConfig::default()))
            .partition(t)
            .expect_err("primaryEmail missing");
        assert!(matches!(err, AppError::MissingColumns(_)));
    }

    #[test]
    fn test_chunking_header_only_is_empty_input() {
        let t = table(&["Id", "Name"], &[]);
        let err = partitioner(Policy::Chunk(ChunkConfig::default()))
            .partition(t)
            .expect_err("no data rows");
        assert!(matches!(err, AppError::EmptyInput));
    }

    #[test]
    fn test_grouping_header_only_is_empty_partition() {
        let t = table(&["primaryEmail"], &[]);
        let partition = partitioner(Policy::Group(GroupConfig::default()))
            .partition(t)
            .expect("partition failed");
        assert!(partition.buckets.is_empty());
    }

    #[test]
    fn test_chunks_are_numbered_from_one() {
        let t = table(&["Id"], &[&["1"], &["2"], &["3"]]);
        let partition = partitioner(Policy::Chunk(ChunkConfig::default().max_bytes(2)))
            .partition(t)
            .expect("partition failed");

        let names: Vec<&BucketName> = partition.buckets.iter().map(|b| &b.name).collect();
        assert_eq!(
            names,
            vec![&BucketName::Chunk(1), &BucketName::Chunk(2), &BucketName::Chunk(3)]
        );
    }

    #[test]
    fn test_output_paths() {
        let input = Path::new("/data/AllUsers.csv");

        let recency = partitioner(Policy::Recency(RecencyConfig::new(cutoff())));
        assert_eq!(
            recency.output_path(&BucketName::Key("a@x.com".into()), input),
            PathBuf::from("out/a_x_com_filtered_events.csv")
        );

        let group = partitioner(Policy::Group(GroupConfig::default()));
        assert_eq!(
            group.output_path(&BucketName::Key("a@x.com".into()), input),
            PathBuf::from("out/a_x_com.csv")
        );

        let chunk = partitioner(Policy::Chunk(ChunkConfig::default()));
        assert_eq!(
            chunk.output_path(&BucketName::Chunk(2), input),
            PathBuf::from("out/AllUsers_part_2.csv")
        );
    }

    #[test]
    fn test_bucket_name_serializes_tagged() {
        let json = serde_json::to_value(BucketName::Chunk(3)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "chunk", "value": 3}));
    }
}
