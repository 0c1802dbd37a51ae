//! Batch transforms for exported calendar-event CSV files.
//!
//! One component, [`partition::CsvPartitioner`], reads a CSV and writes one
//! output file per bucket under one of three policies:
//!
//! - recency filter, then one file per user (`filter_and_split`)
//! - size-bounded chunks (`split_by_size`)
//! - one file per user (`split_csv`)

pub mod commands;
pub mod dates;
pub mod error;
pub mod partition;
pub mod streaming;
pub mod table;
pub mod validation;

pub use error::AppError;
pub use partition::{CsvPartitioner, Policy, RunReport};
