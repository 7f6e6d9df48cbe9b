//! Error types produced by the ingest crate.
//!
//! | Error | Cause |
//! |-------|-------|
//! | [`Io`](IngestError::Io) | The file could not be opened or read |
//! | [`Csv`](IngestError::Csv) | Malformed CSV (bad quoting, invalid UTF-8) |
//! | [`MissingHeader`](IngestError::MissingHeader) | The input has no header row |

use thiserror::Error;

/// Errors raised while loading a report collection.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Carries the source name (path or `"<reader>"`).
    #[error("missing header row in {0}")]
    MissingHeader(String),
}

impl IngestError {
    /// Whether the failure came from the file system rather than its content.
    pub fn is_io(&self) -> bool {
        match self {
            IngestError::Io(_) => true,
            IngestError::Csv(err) => matches!(err.kind(), csv::ErrorKind::Io(_)),
            IngestError::MissingHeader(_) => false,
        }
    }
}
