//! split_csv: write one CSV per user from a calendar export.

use std::process::ExitCode;

use calsplit::commands::{self, group::GroupArgs};
use clap::Parser;

fn main() -> ExitCode {
    commands::init_tracing();

    let args = GroupArgs::parse();
    let result = commands::group::run(&args);
    commands::finish(result, args.format())
}
