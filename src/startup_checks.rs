use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Target directory does not exist: {0:?}")]
    TargetDirectoryMissing(PathBuf),

    #[error("Target file does not exist: {0:?}")]
    TargetFileMissing(PathBuf),

    #[error("Configured font not found: {0:?}")]
    FontMissing(PathBuf),
}

impl StartupCheckError {
    /// Critical failures stop the run before any output directory is created.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::TargetDirectoryMissing(_) | StartupCheckError::TargetFileMissing(_)
        )
    }
}

/// What the run is pointed at.
#[derive(Debug, Clone)]
pub enum Target<'a> {
    Directory(&'a Path),
    File(&'a Path),
}

pub fn perform_startup_checks(
    target: &Target<'_>,
    fonts: &[PathBuf],
) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    match target {
        Target::Directory(dir) => {
            if dir.is_dir() {
                info!("Target directory exists: {:?}", dir);
            } else {
                errors.push(StartupCheckError::TargetDirectoryMissing(dir.to_path_buf()));
            }
        }
        Target::File(file) => {
            if file.is_file() {
                info!("Target file exists: {:?}", file);
            } else {
                errors.push(StartupCheckError::TargetFileMissing(file.to_path_buf()));
            }
        }
    }

    for font in fonts {
        if !font.exists() {
            warn!("Configured font {:?} not found, falling back", font);
            errors.push(StartupCheckError::FontMissing(font.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
