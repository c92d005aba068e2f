use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Library error type
// ---------------------------------------------------------------------------

/// Everything that can abort an identification run.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty input data.
    #[error("input error: {0}")]
    Input(String),

    /// A value at the loading boundary is not a usable number, or a
    /// required column is missing.
    #[error("data format error in {origin}: {message}")]
    DataFormat { origin: String, message: String },

    /// Invalid run configuration (offset, system names, export format...).
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn data_format(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DataFormat {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
