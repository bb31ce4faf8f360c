use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not load image {path:?}: {source}")]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Too few points survived filtering, or the survivors were all collinear.
    #[error("not enough points to build a mesh: {count} point(s) left")]
    InsufficientPoints { count: usize },

    #[error("bad candidate point in {path:?} at line {line}: {reason}")]
    Candidates {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
