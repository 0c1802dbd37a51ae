//! `split_csv`: write one file per user, no date filtering.

use std::path::PathBuf;

use clap::Parser;

use super::console::{say, OutputFormat};
use crate::error::AppError;
use crate::partition::{
    CsvPartitioner, GroupConfig, OutputConfig, Partition, Policy, RunObserver, RunReport,
    DEFAULT_KEY_COLUMN,
};
use crate::streaming::WrittenFile;

/// Split a calendar export CSV into one file per user.
#[derive(Parser, Debug, Clone)]
#[command(name = "split_csv", version, about)]
pub struct GroupArgs {
    /// Calendar export CSV to read.
    pub input: PathBuf,

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

impl GroupArgs {
    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_json_flag(self.json)
    }
}

struct GroupProgress {
    format: OutputFormat,
}

impl RunObserver for GroupProgress {
    fn on_partitioned(&mut self, partition: &Partition) {
        if partition.buckets.is_empty() {
            say(self.format, "No data was found to process.");
        } else {
            say(
                self.format,
                format!(
                    "\nFound data for {} unique emails. Creating files...",
                    partition.buckets.len()
                ),
            );
        }
    }

    fn on_written(&mut self, file: &WrittenFile) {
        say(
            self.format,
            format!(
                "Successfully created: {} with {} event(s).",
                file.path.display(),
                file.rows
            ),
        );
    }
}

pub fn partitioner(args: &GroupArgs) -> CsvPartitioner {
    CsvPartitioner::new(
        Policy::Group(GroupConfig::default().key_column(args.key_column.clone())),
        OutputConfig::new(&args.output_dir),
    )
}

/// Runs the command.
pub fn run(args: &GroupArgs) -> Result<RunReport, AppError> {
    let mut progress = GroupProgress {
        format: args.format(),
    };
    partitioner(args).run(&args.input, &mut progress)
}
