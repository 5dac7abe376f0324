use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// How a failure is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Info,
}

#[derive(Debug, Error)]
pub enum SubframeError {
    /// A batch description line failed validation. `position` is 1-based
    /// and counts accepted records, not raw lines.
    #[error("Invalid entry on line {position}:\n\"{line}\"")]
    Validation { position: usize, line: String },

    #[error("Invalid index at line {line}")]
    InvalidIndex { line: usize },

    #[error("Wrong index at line {line} (expected {expected})")]
    WrongIndex { line: usize, expected: usize },

    #[error("Invalid timing at line {line}")]
    InvalidTiming { line: usize },

    #[error("Timing mismatch at line {line}")]
    TimingMismatch { line: usize },

    #[error("Unexpected end of file")]
    UnexpectedEof,

    #[error("Error accessing file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File not found: {}", .0.display())]
    MissingResource(PathBuf),

    #[error("Invalid marker tag: '{0}'")]
    InvalidMarker(String),

    #[error("No subtitles loaded")]
    NoRecords,
}

impl SubframeError {
    /// Dialog title used when the error is reported.
    pub fn title(&self) -> &'static str {
        match self {
            SubframeError::Validation { .. } => "Invalid file",
            SubframeError::InvalidIndex { .. }
            | SubframeError::WrongIndex { .. }
            | SubframeError::InvalidTiming { .. }
            | SubframeError::TimingMismatch { .. }
            | SubframeError::UnexpectedEof => "Input error",
            SubframeError::Io { .. } => "File error",
            SubframeError::MissingResource(_) => "Missing file",
            SubframeError::InvalidMarker(_) | SubframeError::NoRecords => "Edit error",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SubframeError::UnexpectedEof => Severity::Info,
            _ => Severity::Error,
        }
    }
}
