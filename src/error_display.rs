//! User-facing error message formatting.
//!
//! Uses typed error matching (PivotError variants, io::ErrorKind) rather than
//! string parsing to produce short, actionable messages.

use std::io;
use std::path::Path;

use crate::pivot::PivotError;

/// Format a PivotError as a user-facing message by matching on its variant.
pub fn user_message_from_pivot(err: &PivotError) -> String {
    match err {
        PivotError::Empty => "The file is empty. Expected a header line followed by data rows."
            .to_string(),
        PivotError::MissingColumn { column, available } => format!(
            "Axis column '{}' not found. Use --x-column/--y-column or [pivot] in the config. Available: {}",
            column, available
        ),
        PivotError::DuplicateColumn { column } => format!(
            "Column '{}' appears more than once in the header. Rename one so each series is distinct.",
            column
        ),
        PivotError::Csv(e) => match e.kind() {
            csv::ErrorKind::Io(io_err) => user_message_from_io(io_err, None),
            csv::ErrorKind::Utf8 { .. } => {
                "The file is not valid UTF-8 text. Check the encoding or compression.".to_string()
            }
            _ => format!("Could not read the file as delimited text: {}", e),
        },
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData => {
            "Invalid or corrupted data. Check the compression format and text encoding."
                .to_string()
        }
        ErrorKind::InvalidInput => {
            let msg = err.to_string();
            if msg.contains("is a directory") {
                "Path is a directory, not a file.".to_string()
            } else {
                format!("Invalid input: {}", msg)
            }
        }
        ErrorKind::UnexpectedEof => {
            "Unexpected end of file. The compressed file may be truncated.".to_string()
        }
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        ErrorKind::Other => {
            let msg = err.to_string();
            if msg.contains("No space left") || msg.contains("space left") {
                return "No space left on device. Free up disk space and try again.".to_string();
            }
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            return if context.is_some() {
                format!("I/O error: {}", msg)
            } else {
                msg
            };
        }
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find PivotError or io::Error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, path: Option<&Path>) -> String {
    let with_path = |msg: String| match path {
        Some(p) => format!("Failed to load {}: {}", p.display(), msg),
        None => msg,
    };

    for cause in report.chain() {
        if let Some(pe) = cause.downcast_ref::<PivotError>() {
            return with_path(user_message_from_pivot(pe));
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return with_path(user_message_from_io(io_err, None));
        }
    }

    // first line only, to avoid long tracebacks
    let display = report.to_string();
    let first_line = display.lines().next().unwrap_or("An error occurred");
    with_path(first_line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    #[test]
    fn io_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let msg = user_message_from_io(&err, None);
        assert!(msg.contains("not found"), "got: {}", msg);
    }

    #[test]
    fn io_permission_denied_with_context() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied");
        let msg = user_message_from_io(&err, Some("(presets.json)"));
        assert_eq!(msg, "Permission denied. Check read access. (presets.json)");
    }

    #[test]
    fn io_directory() {
        let err = io::Error::new(io::ErrorKind::InvalidInput, "/tmp is a directory");
        assert_eq!(
            user_message_from_io(&err, None),
            "Path is a directory, not a file."
        );
    }

    #[test]
    fn missing_column_names_the_column() {
        let err = PivotError::MissingColumn {
            column: "Disposal cost".to_string(),
            available: "a, b".to_string(),
        };
        let msg = user_message_from_pivot(&err);
        assert!(msg.contains("'Disposal cost'"), "got: {}", msg);
        assert!(msg.contains("a, b"), "got: {}", msg);
    }

    #[test]
    fn duplicate_column_asks_for_a_rename() {
        let err = PivotError::DuplicateColumn {
            column: "LCOW".to_string(),
        };
        let msg = user_message_from_pivot(&err);
        assert!(msg.contains("'LCOW'"), "got: {}", msg);
        assert!(msg.contains("more than once"), "got: {}", msg);
    }

    #[test]
    fn report_chain_finds_pivot_error_and_prefixes_path() {
        let report = color_eyre::eyre::Report::new(PivotError::Empty);
        let msg = user_message_from_report(&report, Some(Path::new("sweep.csv")));
        assert!(msg.starts_with("Failed to load sweep.csv: The file is empty"), "got: {}", msg);
    }

    #[test]
    fn report_fallback_uses_first_line() {
        let report = eyre!("first line\nsecond line");
        assert_eq!(user_message_from_report(&report, None), "first line");
    }
}
