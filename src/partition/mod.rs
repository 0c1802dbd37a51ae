//! The CSV partitioner and its policies.
//!
//! A run reads one input CSV, assigns every data row to at most one bucket
//! according to a `Policy`, then writes one output file per bucket with the
//! input header repeated.

mod grouping;
mod partitioner;
mod policy;

pub use grouping::{group_by_key, Grouped, RecencyFilter, SkipCounts};
pub use partitioner::{
    Bucket, BucketName, CsvPartitioner, Partition, RunObserver, RunReport, Silent,
};
pub use policy::{
    GroupConfig, OutputConfig, Policy, RecencyConfig, DEFAULT_KEY_COLUMN, FILTERED_EVENTS_SUFFIX,
};
