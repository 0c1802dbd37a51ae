//! Output side of a partition run.
//!
//! This module provides size-bounded chunking of a row sequence, atomic CSV
//! file writing with automatic cleanup on failure, and the file naming rules
//! for keyed buckets and chunks.

mod atomic_writer;
mod bucket_writer;
mod csv_chunker;

pub use atomic_writer::AtomicCsvWriter;
pub use bucket_writer::{
    chunk_file_name, input_stem, key_file_name, sanitize_key, write_bucket, WrittenFile,
};
pub use csv_chunker::{
    chunk_records, estimate_row_size, ChunkConfig, BYTES_PER_MB, DEFAULT_MAX_SIZE_MB,
};
