//! Error types for bindery operations.

use thiserror::Error;

/// Errors that can occur while paginating or packaging a manuscript.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("manuscript parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("render error: {0}")]
    Render(String),

    #[error("no renderable sections in manuscript")]
    NoSections,
}

pub type Result<T> = std::result::Result<T, Error>;
