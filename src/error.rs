use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// User-friendly error presentation for the command line.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPresentation {
    pub title: String,
    pub message: String,
    pub action: Option<String>,
}

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Configuration ─────────────────────────────────────────────────────────
    #[error("CSV must contain the headers: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ── Input ─────────────────────────────────────────────────────────────────
    #[error("The file '{}' was not found", .0.display())]
    InputNotFound(PathBuf),

    #[error("The CSV file is empty")]
    EmptyInput,

    #[error("Invalid CSV: {0}")]
    CsvInvalid(String),

    // ── Output ────────────────────────────────────────────────────────────────
    #[error("Failed to write {}: {message}", .path.display())]
    WriteFailed { path: PathBuf, message: String },

    // ── Generic fallback ──────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true for errors caused by how the tool was invoked rather than
    /// by the data it was given.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AppError::MissingColumns(_) | AppError::InvalidArgument(_)
        )
    }

    /// Converts the error into a presentation suitable for printing to a terminal.
    pub fn to_presentation(&self) -> ErrorPresentation {
        match self {
            // ── Configuration ─────────────────────────────────────────────────
            AppError::MissingColumns(columns) => ErrorPresentation {
                title: "Missing Columns".into(),
                message: format!("CSV must contain the headers: {}", columns.join(", ")),
                action: Some("Export the calendar data with the required columns".into()),
            },

            AppError::InvalidArgument(msg) => ErrorPresentation {
                title: "Invalid Argument".into(),
                message: msg.clone(),
                action: Some("Check the command-line arguments and try again".into()),
            },

            // ── Input ─────────────────────────────────────────────────────────
            AppError::InputNotFound(path) => ErrorPresentation {
                title: "File Not Found".into(),
                message: format!("The file '{}' was not found.", path.display()),
                action: Some("Check the path to the input file".into()),
            },

            AppError::EmptyInput => ErrorPresentation {
                title: "Empty File".into(),
                message: "The CSV file is empty.".into(),
                action: None,
            },

            AppError::CsvInvalid(msg) => ErrorPresentation {
                title: "Invalid CSV".into(),
                message: format!("The CSV file has a formatting problem: {}", msg),
                action: Some("Fix the CSV file and try again".into()),
            },

            // ── Output ────────────────────────────────────────────────────────
            AppError::WriteFailed { path, message } => ErrorPresentation {
                title: "Write Failed".into(),
                message: format!("Could not write '{}': {}", path.display(), message),
                action: Some("Check free disk space and directory permissions".into()),
            },

            // ── Generic ───────────────────────────────────────────────────────
            AppError::Internal(msg) => ErrorPresentation {
                title: "Unexpected Error".into(),
                message: format!("An unexpected error occurred: {}", msg),
                action: None,
            },
        }
    }
}

// Allow AppError to be emitted as part of JSON output
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_presentation().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns all AppError variants for exhaustive testing.
    fn all_variants() -> Vec<AppError> {
        vec![
            AppError::MissingColumns(vec!["primaryEmail".into()]),
            AppError::InvalidArgument("days_ago must be an integer".into()),
            AppError::InputNotFound(PathBuf::from("AllUsers.csv")),
            AppError::EmptyInput,
            AppError::CsvInvalid("invalid UTF-8 in record 2".into()),
            AppError::WriteFailed {
                path: PathBuf::from("a_x_com.csv"),
                message: "disk full".into(),
            },
            AppError::Internal("something broke".into()),
        ]
    }

    #[test]
    fn all_variants_have_nonempty_title_and_message() {
        for variant in all_variants() {
            let presentation = variant.to_presentation();
            assert!(
                !presentation.title.trim().is_empty(),
                "Empty title for {:?}",
                variant
            );
            assert!(
                !presentation.message.trim().is_empty(),
                "Empty message for {:?}",
                variant
            );
        }
    }

    #[test]
    fn missing_columns_lists_every_column() {
        let err = AppError::MissingColumns(vec!["primaryEmail".into(), "start.date".into()]);
        assert_eq!(
            err.to_string(),
            "CSV must contain the headers: primaryEmail, start.date"
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn input_errors_are_not_configuration_errors() {
        assert!(!AppError::EmptyInput.is_configuration());
        assert!(!AppError::InputNotFound(PathBuf::from("x.csv")).is_configuration());
        assert!(AppError::InvalidArgument("x".into()).is_configuration());
    }

    #[test]
    fn not_found_mentions_path() {
        let presentation = AppError::InputNotFound(PathBuf::from("AllUsers.csv")).to_presentation();
        assert!(presentation.message.contains("AllUsers.csv"));
        assert!(presentation.action.is_some());
    }

    #[test]
    fn serialization_produces_valid_json_with_required_fields() {
        for variant in all_variants() {
            let json = serde_json::to_string(&variant)
                .unwrap_or_else(|_| panic!("Failed to serialize {:?}", variant));
            let parsed: serde_json::Value = serde_json::from_str(&json)
                .unwrap_or_else(|_| panic!("Failed to parse JSON for {:?}", variant));

            assert!(parsed.get("title").is_some());
            assert!(parsed.get("message").is_some());
            // action can be null, but field should exist
            assert!(parsed.get("action").is_some());
        }
    }
}
