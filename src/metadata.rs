use crate::error::WatermarkError;
use flate2::Crc;
use rexif::{ExifData, ExifTag};
use std::path::Path;
use tracing::{debug, info, trace};

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Date tags in order of preference: original capture time, then last modification.
const DATE_TAGS: [ExifTag; 2] = [ExifTag::DateTimeOriginal, ExifTag::DateTime];

/// Read the raw capture-date string (e.g. "2023:07:15 10:30:00") from an image.
///
/// Missing or unreadable metadata is not an error for the caller; it is
/// logged and reported as `None`.
pub fn read_capture_date(path: &Path) -> Option<String> {
    match read_exif(path) {
        Ok(exif) => {
            let date = capture_date(&exif);
            if date.is_none() {
                debug!("No date tags in EXIF for {}", path.display());
            }
            date
        }
        Err(e) => {
            info!("No EXIF data for {}: {}", path.display(), e);
            None
        }
    }
}

/// Pick the preferred date tag from parsed EXIF data.
pub fn capture_date(exif: &ExifData) -> Option<String> {
    for tag in &DATE_TAGS {
        let Some(entry) = exif.entries.iter().find(|e| e.tag == *tag) else {
            continue;
        };

        let value = entry
            .value_more_readable
            .trim_matches(|c: char| c == '\0' || c.is_whitespace());
        if !value.is_empty() {
            debug!("Found capture date in {:?}: {}", tag, value);
            return Some(value.to_string());
        }
    }

    None
}

/// JPEG and TIFF go straight through rexif; PNG keeps its EXIF block in an
/// `eXIf` chunk that rexif does not know about, so that payload is handed over
/// as a bare TIFF stream.
fn read_exif(path: &Path) -> Result<ExifData, WatermarkError> {
    let container_err = match rexif::parse_file(path) {
        Ok(exif) => return Ok(exif),
        Err(e) => e,
    };
    trace!("rexif could not read {}: {}", path.display(), container_err);

    let buffer = std::fs::read(path)?;
    if !buffer.starts_with(PNG_SIGNATURE) {
        return Err(WatermarkError::Exif(container_err.to_string()));
    }

    let payload = find_png_chunk(&buffer, b"eXIf")
        .ok_or_else(|| WatermarkError::Exif("PNG has no eXIf chunk".to_string()))?;
    rexif::parse_buffer(payload).map_err(|e| WatermarkError::Exif(e.to_string()))
}

/// Find the data of the first chunk of `kind` whose CRC checks out.
pub(crate) fn find_png_chunk<'a>(buffer: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    if !buffer.starts_with(PNG_SIGNATURE) {
        return None;
    }

    let mut pos = PNG_SIGNATURE.len();

    while pos + 12 <= buffer.len() {
        let chunk_length = u32::from_be_bytes([
            buffer[pos],
            buffer[pos + 1],
            buffer[pos + 2],
            buffer[pos + 3],
        ]) as usize;

        let chunk_type = &buffer[pos + 4..pos + 8];
        let data_start = pos + 8;
        let data_end = data_start.checked_add(chunk_length)?;
        if data_end + 4 > buffer.len() {
            return None;
        }

        if chunk_type == kind {
            let stored_crc = u32::from_be_bytes([
                buffer[data_end],
                buffer[data_end + 1],
                buffer[data_end + 2],
                buffer[data_end + 3],
            ]);

            let mut crc = Crc::new();
            crc.update(&buffer[pos + 4..data_end]);
            if crc.sum() == stored_crc {
                debug!("Found {} chunk: {} bytes", String::from_utf8_lossy(kind), chunk_length);
                return Some(&buffer[data_start..data_end]);
            }
            debug!("Skipping {} chunk with bad CRC", String::from_utf8_lossy(kind));
        }

        if chunk_type == b"IEND" {
            break;
        }

        // length + type + data + CRC
        pos = data_end + 4;
    }

    None
}
