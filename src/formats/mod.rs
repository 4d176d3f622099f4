pub mod jpeg;

use crate::error::WatermarkError;
use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raster formats the tool reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Tiff,
    Bmp,
}

impl OutputFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "tif" | "tiff" => Some(OutputFormat::Tiff),
            "bmp" => Some(OutputFormat::Bmp),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Tiff => ImageFormat::Tiff,
            OutputFormat::Bmp => ImageFormat::Bmp,
        }
    }

    /// JPEG is the only supported format that cannot carry an alpha channel.
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, OutputFormat::Jpeg)
    }
}

/// Encode `image` fully in memory.
pub fn encode(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, WatermarkError> {
    match format {
        OutputFormat::Jpeg => jpeg::encode(image, jpeg::DEFAULT_QUALITY),
        _ => {
            let mut cursor = Cursor::new(Vec::new());
            image.write_to(&mut cursor, format.image_format())?;
            Ok(cursor.into_inner())
        }
    }
}

/// Encode and write `image` to `path`, choosing the encoder from the extension.
///
/// The bytes go to a temporary sibling first and are renamed into place, so
/// an existing file is either fully replaced or left alone.
pub fn save(image: &DynamicImage, path: &Path) -> Result<(), WatermarkError> {
    let format = OutputFormat::from_path(path)
        .ok_or_else(|| WatermarkError::UnsupportedFormat(path.to_path_buf()))?;
    let bytes = encode(image, format)?;
    write_atomic(path, &bytes)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), WatermarkError> {
    let temp_path = temp_path_for(path);

    let result = std::fs::File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| std::fs::rename(&temp_path, path));

    if let Err(e) = result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.part", file_name))
}
