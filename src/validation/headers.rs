//! Required-column checks.

use csv::StringRecord;

use crate::error::AppError;

/// Positions of the required columns, in the order they were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIndex {
    positions: Vec<usize>,
}

impl ColumnIndex {
    /// Position of the `n`th requested column.
    pub fn get(&self, n: usize) -> Option<usize> {
        self.positions.get(n).copied()
    }
}

/// Checks that every name in `required` appears in `header`.
///
/// Duplicate header names resolve to their first occurrence.
///
/// # Errors
///
/// Returns `AppError::MissingColumns` with the full required list when any
/// column is absent, so the message tells the user everything they need.
pub fn require_columns(header: &StringRecord, required: &[&str]) -> Result<ColumnIndex, AppError> {
    let found: Vec<Option<usize>> = required
        .iter()
        .map(|name| header.iter().position(|h| h == *name))
        .collect();

    if found.iter().any(Option::is_none) {
        let missing: Vec<&str> = required
            .iter()
            .zip(&found)
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| *name)
            .collect();
        tracing::debug!(?missing, "Required columns absent from header");

        return Err(AppError::MissingColumns(
            required.iter().map(|s| s.to_string()).collect(),
        ));
    }

    Ok(ColumnIndex {
        positions: found.into_iter().flatten().collect(),
    })
}
