//! Placement of the watermark text relative to the image edges.

use super::Anchor;

/// Dimensions of the image being stamped.
#[derive(Debug, Clone, Copy)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Bounding box of the rendered text.
#[derive(Debug, Clone, Copy)]
pub struct TextDimensions {
    pub width: u32,
    pub height: u32,
}

/// Top-left corner where the text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Calculate the draw origin for the text box.
///
/// Coordinates may be negative when the text is larger than the image; the
/// drawing code clips, so this is not an error.
pub fn calculate_origin(
    anchor: Anchor,
    image: &ImageDimensions,
    text: &TextDimensions,
    margin: u32,
) -> PlacementPosition {
    let img_w = image.width as i32;
    let img_h = image.height as i32;
    let text_w = text.width as i32;
    let text_h = text.height as i32;
    let m = margin as i32;

    match anchor {
        Anchor::TopLeft => PlacementPosition::new(m, m),
        Anchor::Center => PlacementPosition::new((img_w - text_w) / 2, (img_h - text_h) / 2),
        Anchor::BottomRight => PlacementPosition::new(img_w - text_w - m, img_h - text_h - m),
    }
}
