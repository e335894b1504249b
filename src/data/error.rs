use std::path::PathBuf;

use thiserror::Error;

/// The source could not be read at all. Per-value parse failures never
/// produce this; they become missing values instead.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unreadable parquet file: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("malformed table: {0}")]
    Malformed(String),

    #[error("file has no header row")]
    EmptyFile,

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}
