//! `split_by_size`: split a large CSV into size-bounded parts.

use std::path::PathBuf;

use clap::Parser;

use super::console::{say, OutputFormat};
use crate::error::AppError;
use crate::partition::{CsvPartitioner, OutputConfig, Policy, RunObserver, RunReport};
use crate::streaming::{ChunkConfig, WrittenFile, DEFAULT_MAX_SIZE_MB};

/// Split a large CSV file into parts of at most a given size, each with the header.
#[derive(Parser, Debug, Clone)]
#[command(name = "split_by_size", version, about)]
pub struct ChunkArgs {
    /// CSV file to split.
    pub input: PathBuf,

    /// Maximum size of each part in megabytes. Zero or less puts every row in its own part.
    #[arg(
        env = "CALSPLIT_MAX_SIZE_MB",
        default_value_t = DEFAULT_MAX_SIZE_MB as i64,
        allow_negative_numbers = true
    )]
    pub max_size_mb: i64,

    /// Directory to write output files to.
    #[arg(long, env = "CALSPLIT_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Print the run report as JSON instead of progress lines.
    #[arg(long)]
    pub json: bool,
}

impl ChunkArgs {
    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_json_flag(self.json)
    }
}

struct ChunkProgress {
    format: OutputFormat,
}

impl RunObserver for ChunkProgress {
    fn on_written(&mut self, file: &WrittenFile) {
        say(
            self.format,
            format!("Created chunk: {} with {} row(s).", file.path.display(), file.rows),
        );
    }
}

pub fn partitioner(args: &ChunkArgs) -> CsvPartitioner {
    CsvPartitioner::new(
        Policy::Chunk(ChunkConfig::from_megabytes(
            u64::try_from(args.max_size_mb).unwrap_or(0),
        )),
        OutputConfig::new(&args.output_dir),
    )
}

/// Runs the command.
pub fn run(args: &ChunkArgs) -> Result<RunReport, AppError> {
    let format = args.format();
    let mut progress = ChunkProgress { format };
    let report = partitioner(args).run(&args.input, &mut progress)?;

    say(format, "\nSplitting process completed successfully.");
    Ok(report)
}
