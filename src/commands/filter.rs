//! `filter_and_split`: keep recent events and write one file per user.

use std::path::PathBuf;

use clap::Parser;

use super::console::{say, OutputFormat};
use crate::dates::Cutoff;
use crate::error::AppError;
use crate::partition::{
    CsvPartitioner, GroupConfig, OutputConfig, Partition, Policy, RecencyConfig, RunObserver,
    RunReport, DEFAULT_KEY_COLUMN, FILTERED_EVENTS_SUFFIX,
};
use crate::streaming::WrittenFile;

/// Filter calendar events by recency and split them into one CSV per user.
#[derive(Parser, Debug, Clone)]
#[command(name = "filter_and_split", version, about)]
pub struct FilterArgs {
    /// Calendar export CSV to read.
    pub input: PathBuf,

    /// Keep events starting on or after this many days ago.
    #[arg(allow_negative_numbers = true)]
    pub days_ago: i64,

    /// Directory to write output files to.
    #[arg(long, env = "CALSPLIT_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Column identifying the user.
    #[arg(long, env = "CALSPLIT_KEY_COLUMN", default_value = DEFAULT_KEY_COLUMN)]
    pub key_column: String,

    /// Print the run report as JSON instead of progress lines.
    #[arg(long)]
    pub json: bool,
}

impl FilterArgs {
    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_json_flag(self.json)
    }
}

struct FilterProgress {
    format: OutputFormat,
    days_ago: i64,
}

impl RunObserver for FilterProgress {
    fn on_partitioned(&mut self, partition: &Partition) {
        if partition.buckets.is_empty() {
            say(self.format, "\nNo events found within the specified date range.");
        } else {
            say(
                self.format,
                format!(
                    "\nFound {} users with events in the last {} days. Creating files...",
                    partition.buckets.len(),
                    self.days_ago
                ),
            );
        }
    }

    fn on_written(&mut self, file: &WrittenFile) {
        say(
            self.format,
            format!("Created: {} with {} event(s).", file.path.display(), file.rows),
        );
    }
}

/// Builds the partitioner for `args`, with the cutoff taken from the current
/// local time.
pub fn partitioner(args: &FilterArgs) -> Result<CsvPartitioner, AppError> {
    let cutoff = Cutoff::days_ago(args.days_ago)?;
    let group = GroupConfig::default()
        .key_column(args.key_column.clone())
        .file_suffix(FILTERED_EVENTS_SUFFIX);
    let policy = Policy::Recency(RecencyConfig::new(cutoff).group(group));

    Ok(CsvPartitioner::new(policy, OutputConfig::new(&args.output_dir)))
}

/// Runs the command.
pub fn run(args: &FilterArgs) -> Result<RunReport, AppError> {
    let partitioner = partitioner(args)?;
    let format = args.format();

    if let Policy::Recency(config) = partitioner.policy() {
        say(
            format,
            format!(
                "Filtering events on or after: {} (local time)...",
                config.cutoff.at().format("%Y-%m-%d")
            ),
        );
    }

    let mut progress = FilterProgress {
        format,
        days_ago: args.days_ago,
    };
    let report = partitioner.run(&args.input, &mut progress)?;

    if !report.files.is_empty() {
        say(
            format,
            format!(
                "\nCreated {} file(s) with {} event(s).",
                report.files.len(),
                report.rows_written
            ),
        );
    }

    Ok(report)
}
