//! Size-bounded CSV chunking.
//!
//! Splits a row sequence into ordered chunks whose estimated byte size stays
//! within a budget. The estimate is the UTF-8 length of the comma-joined
//! fields plus one newline byte; quoting overhead and the header line are not
//! counted, so written chunk files run slightly larger than the budget.

use csv::StringRecord;

/// Bytes per megabyte for `ChunkConfig::from_megabytes`.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Default chunk budget in megabytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 5;

/// Configuration for CSV chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum estimated bytes per chunk, header excluded (default: 5 MB).
    pub max_bytes: u64,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self::from_megabytes(DEFAULT_MAX_SIZE_MB)
    }
}

impl ChunkConfig {
    /// Creates a ChunkConfig with a budget of `mb` megabytes.
    pub fn from_megabytes(mb: u64) -> Self {
        Self {
            max_bytes: mb.saturating_mul(BYTES_PER_MB),
        }
    }

    /// Sets the max_bytes limit.
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }
}

/// Estimated serialized size of a row: comma-joined fields plus `\n`.
pub fn estimate_row_size(record: &StringRecord) -> u64 {
    let field_bytes: usize = record.iter().map(str::len).sum();
    let commas = record.len().saturating_sub(1);
    (field_bytes + commas + 1) as u64
}

/// Splits `records` into chunks that respect `config.max_bytes`.
///
/// Rows keep their input order and every row lands in exactly one chunk. A
/// row is only moved to a new chunk when the current one already holds at
/// least one row, so a single row larger than the budget gets a chunk of its
/// own instead of producing an empty chunk.
pub fn chunk_records(
    records: impl IntoIterator<Item = StringRecord>,
    config: &ChunkConfig,
) -> Vec<Vec<StringRecord>> {
    let mut chunks: Vec<Vec<StringRecord>> = Vec::new();

    // State for current chunk
    let mut current: Vec<StringRecord> = Vec::new();
    let mut current_bytes: u64 = 0;

    for record in records {
        let record_size = estimate_row_size(&record);

        if would_exceed_limits(current_bytes, current.len(), record_size, config) {
            #[cfg(debug_assertions)]
            tracing::debug!(
                chunk = chunks.len() + 1,
                rows = current.len(),
                bytes = current_bytes,
                "Completed chunk"
            );

            chunks.push(std::mem::take(&mut current));
            current_bytes = 0;
        }

        current_bytes += record_size;
        current.push(record);
    }

    // Finalize the last chunk
    if !current.is_empty() {
        #[cfg(debug_assertions)]
        tracing::debug!(
            chunk = chunks.len() + 1,
            rows = current.len(),
            bytes = current_bytes,
            "Completed final chunk"
        );

        chunks.push(current);
    }

    chunks
}

/// Checks if adding a record would push the current chunk over budget.
fn would_exceed_limits(
    current_bytes: u64,
    current_rows: usize,
    record_size: u64,
    config: &ChunkConfig,
) -> bool {
    // The first record of a chunk is always admitted, even when it alone
    // exceeds max_bytes
    if current_rows == 0 {
        return false;
    }

    current_bytes + record_size > config.max_bytes
}
