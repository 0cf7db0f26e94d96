use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PenprintError>;

#[derive(Debug, Error)]
pub enum PenprintError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input path does not exist: {0}")]
    MissingPath(PathBuf),

    #[error("no reference data: at least one reference corpus is required to classify")]
    EmptyReferenceSet,

    #[error("compressor failure ({codec}): {source}")]
    Compressor {
        codec: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid evaluation options: {0}")]
    InvalidOptions(String),
}
