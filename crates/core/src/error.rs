use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while serializing transcripts.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading a log or writing a document failed
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input path is neither a file nor a directory
    #[error("Invalid input path: {0:?}")]
    InvalidInput(PathBuf),

    /// Input directory holds no JSONL logs
    #[error("No JSONL files found under {0:?}")]
    NoInputFiles(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
