//! Where the images to stamp come from, and where their copies go.
//!
//! Every source writes into a `<name>_watermark` directory placed next to
//! its input, so the pipeline never has to know which mode it runs in.

use crate::error::WatermarkError;
use crate::formats::OutputFormat;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Suffix of the output directory name.
pub const OUTPUT_DIR_SUFFIX: &str = "_watermark";

/// Yields the input files of a run and the directory results are written to.
pub trait FileSource {
    fn files(&self) -> Result<Vec<PathBuf>, WatermarkError>;
    fn output_dir(&self) -> Result<PathBuf, WatermarkError>;
}

/// Whether the file extension names one of the supported raster formats.
pub fn is_supported_image(path: &Path) -> bool {
    OutputFormat::from_path(path).is_some()
}

/// `<parent>/<basename(dir)>_watermark`, i.e. a sibling of `dir`.
fn sibling_output_dir(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = dir.parent().unwrap_or(dir);
    parent.join(format!("{}{}", name, OUTPUT_DIR_SUFFIX))
}

/// Absolute form of `path` so that `.` and `photos/` still have a name and a parent.
fn absolute(path: &Path) -> Result<PathBuf, WatermarkError> {
    Ok(std::path::absolute(path)?.components().collect())
}

/// A single image picked by the user.
#[derive(Debug, Clone)]
pub struct SingleFile {
    path: PathBuf,
}

impl SingleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for SingleFile {
    fn files(&self) -> Result<Vec<PathBuf>, WatermarkError> {
        if !self.path.is_file() {
            return Err(WatermarkError::NotAFile(self.path.clone()));
        }
        Ok(vec![self.path.clone()])
    }

    /// The output directory sits inside the file's own directory.
    fn output_dir(&self) -> Result<PathBuf, WatermarkError> {
        let path = absolute(&self.path)?;
        let parent = path
            .parent()
            .ok_or_else(|| WatermarkError::NotAFile(self.path.clone()))?;
        let name = parent
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(parent.join(format!("{}{}", name, OUTPUT_DIR_SUFFIX)))
    }
}

/// All supported images directly inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    dir: PathBuf,
}

impl DirectoryListing {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileSource for DirectoryListing {
    fn files(&self) -> Result<Vec<PathBuf>, WatermarkError> {
        if !self.dir.is_dir() {
            return Err(WatermarkError::TargetMissing(self.dir.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if is_supported_image(entry.path()) {
                files.push(entry.into_path());
            } else {
                debug!("Ignoring unsupported file {}", entry.path().display());
            }
        }

        Ok(files)
    }

    fn output_dir(&self) -> Result<PathBuf, WatermarkError> {
        Ok(sibling_output_dir(&absolute(&self.dir)?))
    }
}

/// Ask for a path on a line-oriented reader, usually stdin.
///
/// An empty answer or end of input counts as the user cancelling.
pub fn prompt_for_file<R: BufRead>(mut reader: R) -> Result<Option<SingleFile>, WatermarkError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let answer = line.trim().trim_matches(|c: char| c == '"' || c == '\'');
    if answer.is_empty() {
        return Ok(None);
    }
    Ok(Some(SingleFile::new(answer)))
}
