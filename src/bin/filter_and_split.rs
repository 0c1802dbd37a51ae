//! filter_and_split: keep recent calendar events and write one CSV per user.
//!
//! Usage: `filter_and_split <input.csv> <days_ago>`

use std::process::ExitCode;

use calsplit::commands::{self, filter::FilterArgs};
use clap::Parser;

fn main() -> ExitCode {
    commands::init_tracing();

    let args = FilterArgs::parse();
    let result = commands::filter::run(&args);
    commands::finish(result, args.format())
}
