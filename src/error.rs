use thiserror::Error;

/// Errors surfaced by the tracking engine. The shell decides how to present them; none of them
/// leaves the in-memory state half updated.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("entry {index} does not exist, there are {len} entries")]
    Index { index: usize, len: usize },
    #[error("row {row} of the entries file is corrupt: {reason}")]
    Parse { row: usize, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to export report: {0}")]
    Export(String),
}

impl TrackerError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
