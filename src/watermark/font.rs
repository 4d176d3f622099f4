//! Font lookup and text rasterization.
//!
//! Faces are resolved through an ordered list of [`FontStrategy`] values.
//! The list always ends with the built-in 8x8 bitmap face, so lookup cannot
//! fail; a missing system font only degrades how the text looks.

use crate::error::WatermarkError;
use ab_glyph::{FontVec, PxScale};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Side length of a glyph in the built-in bitmap face.
const BITMAP_GLYPH_SIZE: u32 = 8;

/// One step in the font lookup chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontStrategy {
    /// A TrueType/OpenType file at a fixed path.
    File(PathBuf),
    /// The 8x8 bitmap face compiled into the binary.
    Builtin,
}

/// Ordered list of font lookups, tried front to back.
#[derive(Debug, Clone)]
pub struct FontSearch {
    strategies: Vec<FontStrategy>,
}

impl FontSearch {
    /// User-preferred files first, then well-known system fonts, then the bitmap face.
    pub fn new(preferred: &[PathBuf]) -> Self {
        let strategies = preferred
            .iter()
            .cloned()
            .chain(system_font_candidates().iter().map(PathBuf::from))
            .map(FontStrategy::File)
            .chain(std::iter::once(FontStrategy::Builtin))
            .collect();
        Self { strategies }
    }

    pub fn strategies(&self) -> &[FontStrategy] {
        &self.strategies
    }
}

fn system_font_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/Library/Fonts/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &["C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\segoeui.ttf"]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
        ]
    }
}

/// A face able to measure and rasterize a line of text.
pub enum FontFace {
    Outline { font: FontVec, source: PathBuf },
    Bitmap,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontFace::Outline { source, .. } => {
                f.debug_struct("Outline").field("source", source).finish()
            }
            FontFace::Bitmap => f.write_str("Bitmap"),
        }
    }
}

/// Walk the search list and return the first face that loads.
pub fn load_face(search: &FontSearch) -> FontFace {
    for strategy in search.strategies() {
        match strategy {
            FontStrategy::File(path) => match load_font_file(path) {
                Ok(face) => {
                    info!("Using font {}", path.display());
                    return face;
                }
                Err(e) => debug!("Font lookup skipped: {}", e),
            },
            FontStrategy::Builtin => break,
        }
    }

    info!("No outline font available, using built-in bitmap face");
    FontFace::Bitmap
}

/// Load a single TrueType/OpenType font file.
pub fn load_font_file(path: &Path) -> Result<FontFace, WatermarkError> {
    let font_data = std::fs::read(path).map_err(|e| WatermarkError::FontLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let font = FontVec::try_from_vec(font_data).map_err(|e| WatermarkError::FontLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(FontFace::Outline {
        font,
        source: path.to_path_buf(),
    })
}

impl FontFace {
    /// Width and height of `text` rendered at `size` pixels.
    pub fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        match self {
            FontFace::Outline { font, .. } => text_size(PxScale::from(size as f32), font, text),
            FontFace::Bitmap => {
                let cell = bitmap_cell(size);
                (text.chars().count() as u32 * cell, cell)
            }
        }
    }

    /// Rasterize `text` as coverage values into `mask`, top-left at (x, y).
    ///
    /// Pixels falling outside the mask are clipped.
    pub fn draw_mask(&self, mask: &mut GrayImage, x: i32, y: i32, text: &str, size: u32) {
        match self {
            FontFace::Outline { font, .. } => {
                draw_text_mut(mask, Luma([255u8]), x, y, PxScale::from(size as f32), font, text)
            }
            FontFace::Bitmap => draw_bitmap_text(mask, x, y, text, bitmap_cell(size)),
        }
    }
}

/// Bitmap glyphs only scale by whole multiples of 8 px.
fn bitmap_cell(size: u32) -> u32 {
    (size / BITMAP_GLYPH_SIZE).max(1) * BITMAP_GLYPH_SIZE
}

fn draw_bitmap_text(mask: &mut GrayImage, x: i32, y: i32, text: &str, cell: u32) {
    let scale = (cell / BITMAP_GLYPH_SIZE) as i32;
    let (width, height) = (mask.width() as i32, mask.height() as i32);

    for (idx, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or_default();
        let origin_x = x + idx as i32 * cell as i32;

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..BITMAP_GLYPH_SIZE as i32 {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                let base_x = origin_x + col * scale;
                let base_y = y + row as i32 * scale;
                for dy in 0..scale {
                    for dx in 0..scale {
                        let (px, py) = (base_x + dx, base_y + dy);
                        if px >= 0 && py >= 0 && px < width && py < height {
                            mask.put_pixel(px as u32, py as u32, Luma([255]));
                        }
                    }
                }
            }
        }
    }
}
