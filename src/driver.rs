//! The per-file pipeline and the loop that feeds it.

use crate::date::parse_date;
use crate::error::WatermarkError;
use crate::formats::{self, OutputFormat};
use crate::metadata::read_capture_date;
use crate::source::FileSource;
use crate::watermark::{FontFace, WatermarkSpec, apply_watermark, flatten_for};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Result of stamping one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub date_text: String,
}

/// A file that could not be stamped, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub input: PathBuf,
    pub reason: String,
}

/// Summary of a whole run. Entries are in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub entries: Vec<Result<FileOutcome, FileFailure>>,
}

impl BatchReport {
    pub fn processed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.entries.iter().filter_map(|entry| entry.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileFailure> {
        self.entries.iter().filter_map(|entry| entry.as_ref().err())
    }

    pub fn succeeded(&self) -> usize {
        self.processed().count()
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }
}

/// Read-only state shared by every file of a run.
#[derive(Debug)]
pub struct Pipeline {
    spec: WatermarkSpec,
    face: FontFace,
}

impl Pipeline {
    pub fn new(spec: WatermarkSpec, face: FontFace) -> Self {
        Self { spec, face }
    }

    /// Stamp one image into `output_dir`, keeping its file name.
    ///
    /// Decoded buffers live only for the duration of this call.
    pub fn process_file(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<FileOutcome, WatermarkError> {
        let file_name = input
            .file_name()
            .ok_or_else(|| WatermarkError::NotAFile(input.to_path_buf()))?;
        let output = output_dir.join(file_name);
        let format = OutputFormat::from_path(&output)
            .ok_or_else(|| WatermarkError::UnsupportedFormat(output.clone()))?;

        let raw_date = read_capture_date(input);
        let date_text = parse_date(raw_date.as_deref());
        debug!("Date text for {}: {}", input.display(), date_text);

        let source = image::ImageReader::open(input)?
            .with_guessed_format()?
            .decode()?;

        let stamped = apply_watermark(&source, &date_text, &self.spec, &self.face);
        drop(source);

        let final_image = flatten_for(format, stamped);
        formats::save(&final_image, &output)?;

        Ok(FileOutcome {
            input: input.to_path_buf(),
            output,
            date_text,
        })
    }

    /// Process every file from `source`, carrying on past per-file failures.
    ///
    /// Only enumeration and output directory errors abort the run.
    pub fn run(&self, source: &dyn FileSource) -> Result<BatchReport, WatermarkError> {
        let files = source.files()?;
        let output_dir = source.output_dir()?;
        std::fs::create_dir_all(&output_dir)?;
        info!(
            "Stamping {} file(s) into {}",
            files.len(),
            output_dir.display()
        );

        let mut report = BatchReport {
            output_dir: output_dir.clone(),
            ..Default::default()
        };

        for input in files {
            let entry = match self.process_file(&input, &output_dir) {
                Ok(outcome) => {
                    info!(
                        "Stamped {} -> {}",
                        outcome.input.display(),
                        outcome.output.display()
                    );
                    Ok(outcome)
                }
                Err(e) => {
                    error!("Failed to process {}: {}", input.display(), e);
                    Err(FileFailure {
                        input,
                        reason: e.to_string(),
                    })
                }
            };
            report.entries.push(entry);
        }

        Ok(report)
    }
}
