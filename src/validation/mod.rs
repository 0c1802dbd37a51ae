//! Header validation for input CSVs.
//!
//! The only schema check performed is that the columns a policy reads are
//! present in the header.

pub mod headers;

pub use headers::{require_columns, ColumnIndex};
