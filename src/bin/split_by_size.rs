//! split_by_size: split a large CSV into parts of at most N megabytes.

use std::process::ExitCode;

use calsplit::commands::{self, chunk::ChunkArgs};
use clap::Parser;

fn main() -> ExitCode {
    commands::init_tracing();

    let args = ChunkArgs::parse();
    let result = commands::chunk::run(&args);
    commands::finish(result, args.format())
}
