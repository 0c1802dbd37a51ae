//! Terminal output shared by all commands.

use std::process::ExitCode;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::partition::RunReport;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Exit code for invalid invocations, matching clap.
const USAGE_EXIT_CODE: u8 = 2;

/// How a command reports its progress and outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per written file, for people.
    #[default]
    Text,
    /// A single JSON document on stdout, for scripts.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Installs the stderr log subscriber. Filter comes from `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Serialize)]
struct ErrorOutput<'a> {
    error: &'a AppError,
}

/// Prints the outcome of a run and maps it to a process exit code.
pub fn finish(result: Result<RunReport, AppError>, format: OutputFormat) -> ExitCode {
    match (result, format) {
        (Ok(report), OutputFormat::Json) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: failed to encode report: {}", e);
                ExitCode::FAILURE
            }
        },
        (Ok(_), OutputFormat::Text) => ExitCode::SUCCESS,
        (Err(err), OutputFormat::Json) => {
            match serde_json::to_string_pretty(&ErrorOutput { error: &err }) {
                Ok(json) => println!("{}", json),
                Err(_) => eprintln!("Error: {}", err),
            }
            error_exit_code(&err)
        }
        (Err(err), OutputFormat::Text) => {
            print_error(&err);
            error_exit_code(&err)
        }
    }
}

/// Usage problems exit like clap's own argument errors.
fn error_exit_code(err: &AppError) -> ExitCode {
    if err.is_configuration() {
        ExitCode::from(USAGE_EXIT_CODE)
    } else {
        ExitCode::FAILURE
    }
}

fn print_error(err: &AppError) {
    let presentation = err.to_presentation();
    eprintln!("Error: {}", presentation.message);
    if let Some(action) = presentation.action {
        eprintln!("  hint: {}", action);
    }
}

/// Prints `line` unless output is JSON.
pub(super) fn say(format: OutputFormat, line: impl AsRef<str>) {
    if format == OutputFormat::Text {
        println!("{}", line.as_ref());
    }
}
