//! Rendering the date text onto an image.
//!
//! The text is drawn on a transparent overlay the size of the source, which
//! is then blended over the source. The source pixels are never drawn on
//! directly, so text alpha composes with image alpha correctly.

pub mod blend;
pub mod font;
pub mod position;

pub use font::{FontFace, FontSearch, FontStrategy, load_face};
pub use position::{ImageDimensions, PlacementPosition, TextDimensions, calculate_origin};

use crate::formats::OutputFormat;
use image::{DynamicImage, GrayImage, Rgba, RgbaImage};
use tracing::{debug, warn};

/// Distance in pixels between the text box and the image edges.
pub const DEFAULT_MARGIN: u32 = 20;

pub const DEFAULT_FONT_SIZE: u32 = 24;

/// Where the text box is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    TopLeft,
    Center,
    #[default]
    BottomRight,
}

impl Anchor {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "top-left" | "topleft" | "左上角" => Some(Anchor::TopLeft),
            "center" | "centre" | "居中" => Some(Anchor::Center),
            "bottom-right" | "bottomright" | "右下角" => Some(Anchor::BottomRight),
            _ => None,
        }
    }

    /// Unknown names fall back to the top-left corner.
    pub fn parse_lenient(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            warn!("Unknown position {:?}, using top-left", name);
            Anchor::TopLeft
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "top-left",
            Anchor::Center => "center",
            Anchor::BottomRight => "bottom-right",
        }
    }
}

/// How the watermark looks, fixed for a whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkSpec {
    pub font_size: u32,
    pub color: Rgba<u8>,
    pub anchor: Anchor,
    pub margin: u32,
}

impl WatermarkSpec {
    pub fn new(font_size: u32, color: Rgba<u8>, anchor: Anchor) -> Self {
        Self {
            font_size: font_size.max(1),
            color,
            anchor,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE, Rgba([255, 255, 255, 128]), Anchor::default())
    }
}

/// Stamp `text` onto `source`. The result always has the source's dimensions.
pub fn apply_watermark(
    source: &DynamicImage,
    text: &str,
    spec: &WatermarkSpec,
    face: &FontFace,
) -> RgbaImage {
    let mut base = source.to_rgba8();
    let overlay = render_overlay(base.width(), base.height(), text, spec, face);
    blend::alpha_composite(&mut base, &overlay);
    base
}

/// Build the transparent layer holding only the text.
pub fn render_overlay(
    width: u32,
    height: u32,
    text: &str,
    spec: &WatermarkSpec,
    face: &FontFace,
) -> RgbaImage {
    let (text_width, text_height) = face.measure(text, spec.font_size);
    let origin = calculate_origin(
        spec.anchor,
        &ImageDimensions { width, height },
        &TextDimensions {
            width: text_width,
            height: text_height,
        },
        spec.margin,
    );
    debug!(
        "Text {:?} is {}x{}, drawing at ({}, {}) on {}x{}",
        text, text_width, text_height, origin.x, origin.y, width, height
    );

    let mut mask = GrayImage::new(width, height);
    face.draw_mask(&mut mask, origin.x, origin.y, text, spec.font_size);

    let [r, g, b, a] = spec.color.0;
    RgbaImage::from_fn(width, height, |x, y| {
        let coverage = mask.get_pixel(x, y)[0] as u32;
        let alpha = (a as u32 * coverage + 127) / 255;
        Rgba([r, g, b, alpha as u8])
    })
}

/// Drop the alpha channel when the target format cannot store it.
pub fn flatten_for(format: OutputFormat, image: RgbaImage) -> DynamicImage {
    if format.supports_alpha() {
        DynamicImage::ImageRgba8(image)
    } else {
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([200, 50, 25, 255])
            } else {
                Rgba([5, 90, 180, 77])
            }
        }))
    }

    #[test]
    fn test_anchor_names() {
        assert_eq!(Anchor::from_name("top-left"), Some(Anchor::TopLeft));
        assert_eq!(Anchor::from_name("CENTER"), Some(Anchor::Center));
        assert_eq!(Anchor::from_name("bottom_right"), Some(Anchor::BottomRight));
        assert_eq!(Anchor::from_name("右下角"), Some(Anchor::BottomRight));
        assert_eq!(Anchor::from_name("middle"), None);
    }

    #[test]
    fn test_unknown_anchor_is_top_left() {
        assert_eq!(Anchor::parse_lenient("somewhere"), Anchor::TopLeft);
        assert_eq!(Anchor::parse_lenient("center"), Anchor::Center);
        assert_eq!(Anchor::default(), Anchor::BottomRight);
    }

    #[test]
    fn test_spec_defaults() {
        let spec = WatermarkSpec::default();
        assert_eq!(spec.font_size, 24);
        assert_eq!(spec.color, Rgba([255, 255, 255, 128]));
        assert_eq!(spec.anchor, Anchor::BottomRight);
        assert_eq!(spec.margin, 20);
    }

    #[test]
    fn test_dimensions_preserved() {
        let source = checkerboard(123, 77);
        let out = apply_watermark(
            &source,
            "2023-07-15",
            &WatermarkSpec::default(),
            &FontFace::Bitmap,
        );
        assert_eq!(out.dimensions(), (123, 77));
    }

    #[test]
    fn test_zero_alpha_color_leaves_source_untouched() {
        let source = checkerboard(200, 120);
        let spec = WatermarkSpec::new(32, Rgba([255, 255, 255, 0]), Anchor::Center);
        let out = apply_watermark(&source, "2023-07-15", &spec, &FontFace::Bitmap);
        assert_eq!(out, source.to_rgba8());
    }

    #[test]
    fn test_text_lands_in_bottom_right_corner() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            400,
            300,
            Rgba([0, 0, 0, 255]),
        ));
        let spec = WatermarkSpec::new(24, Rgba([255, 255, 255, 255]), Anchor::BottomRight);
        let out = apply_watermark(&source, "2023-07-15", &spec, &FontFace::Bitmap);

        let (tw, th) = FontFace::Bitmap.measure("2023-07-15", 24);
        let (left, top) = (400 - tw - 20, 300 - th - 20);

        let mut lit = 0;
        for (x, y, p) in out.enumerate_pixels() {
            if p[0] > 0 {
                lit += 1;
                assert!(x >= left && x < 400 - 20, "lit pixel at x={}", x);
                assert!(y >= top && y < 300 - 20, "lit pixel at y={}", y);
            }
        }
        assert!(lit > 0, "no text was drawn");
    }

    #[test]
    fn test_overlay_alpha_follows_color() {
        let spec = WatermarkSpec::new(16, Rgba([10, 20, 30, 100]), Anchor::TopLeft);
        let overlay = render_overlay(100, 60, "8", &spec, &FontFace::Bitmap);

        let alphas: Vec<u8> = overlay.pixels().map(|p| p[3]).collect();
        assert!(alphas.iter().all(|&a| a == 0 || a == 100));
        assert!(alphas.contains(&100));
        assert_eq!(*overlay.get_pixel(0, 0), Rgba([10, 20, 30, 0]));
    }

    #[test]
    fn test_flatten_for_jpeg_drops_alpha() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 4]));
        let flat = flatten_for(OutputFormat::Jpeg, img.clone());
        assert!(matches!(flat, DynamicImage::ImageRgb8(_)));

        let kept = flatten_for(OutputFormat::Png, img);
        assert!(matches!(kept, DynamicImage::ImageRgba8(_)));
    }
}
