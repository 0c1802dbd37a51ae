//! Command-line entry points, one per partition policy.
//!
//! Each command parses its arguments with `clap`, builds a `CsvPartitioner`,
//! prints progress as files are written and turns the outcome into an exit
//! code. The binaries under `src/bin/` are thin wrappers around these.

pub mod chunk;
mod console;
pub mod filter;
pub mod group;

pub use console::{finish, init_tracing, OutputFormat};
