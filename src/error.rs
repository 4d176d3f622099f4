use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatermarkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("EXIF error: {0}")]
    Exif(String),

    #[error("Failed to load font {path:?}: {reason}")]
    FontLoad { path: PathBuf, reason: String },

    #[error("Invalid color expression: {0:?}")]
    InvalidColor(String),

    #[error("Target directory does not exist: {0:?}")]
    TargetMissing(PathBuf),

    #[error("Not a file: {0:?}")]
    NotAFile(PathBuf),

    #[error("Unsupported output format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),
}
