//! Policy configuration.

use std::path::PathBuf;

use serde::Serialize;

use crate::dates::{Cutoff, START_DATE_COLUMN, START_DATE_TIME_COLUMN};
use crate::streaming::ChunkConfig;

/// Column identifying the owner of a calendar event.
pub const DEFAULT_KEY_COLUMN: &str = "primaryEmail";

/// File name suffix for recency-filtered output.
pub const FILTERED_EVENTS_SUFFIX: &str = "_filtered_events";

/// Configuration for grouping rows by a key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupConfig {
    /// Column whose value names the bucket (default: `primaryEmail`).
    pub key_column: String,
    /// Appended to the sanitized key before `.csv` (default: empty).
    pub file_suffix: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            file_suffix: String::new(),
        }
    }
}

impl GroupConfig {
    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }

    pub fn file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }
}

/// Configuration for the recency filter applied before grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecencyConfig {
    pub cutoff: Cutoff,
    pub group: GroupConfig,
    pub date_time_column: String,
    pub date_column: String,
}

impl RecencyConfig {
    /// Recency filter over the standard calendar export columns, writing
    /// `<key>_filtered_events.csv` files.
    pub fn new(cutoff: Cutoff) -> Self {
        Self {
            cutoff,
            group: GroupConfig::default().file_suffix(FILTERED_EVENTS_SUFFIX),
            date_time_column: START_DATE_TIME_COLUMN.to_string(),
            date_column: START_DATE_COLUMN.to_string(),
        }
    }

    pub fn group(mut self, group: GroupConfig) -> Self {
        self.group = group;
        self
    }
}

/// How rows are assigned to buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Keep rows on or after the cutoff, then group by key.
    Recency(RecencyConfig),
    /// Split the row sequence into size-bounded chunks.
    Chunk(ChunkConfig),
    /// Group every row by key.
    Group(GroupConfig),
}

impl Policy {
    /// Columns the policy reads, in the order they are reported when missing.
    pub fn required_columns(&self) -> Vec<&str> {
        match self {
            Policy::Recency(config) => vec![
                config.group.key_column.as_str(),
                config.date_column.as_str(),
                config.date_time_column.as_str(),
            ],
            Policy::Chunk(_) => Vec::new(),
            Policy::Group(config) => vec![config.key_column.as_str()],
        }
    }

    /// Short name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Recency(_) => "recency",
            Policy::Chunk(_) => "chunk",
            Policy::Group(_) => "group",
        }
    }
}

/// Where output files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Output directory (default: current working directory). Created if missing.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl OutputConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}
