//! Alpha blending of the overlay layer onto the source image.

use image::{Rgba, RgbaImage};

/// Composite `overlay` over `base` in place using the Porter-Duff "over" operator.
///
/// Both images carry straight (non-premultiplied) alpha and must have the
/// same dimensions; only the overlapping region is touched otherwise.
pub fn alpha_composite(base: &mut RgbaImage, overlay: &RgbaImage) {
    let width = base.width().min(overlay.width());
    let height = base.height().min(overlay.height());

    for y in 0..height {
        for x in 0..width {
            let fg = *overlay.get_pixel(x, y);
            if fg[3] == 0 {
                continue;
            }
            let bg = base.get_pixel_mut(x, y);
            *bg = blend_pixels(*bg, fg);
        }
    }
}

/// result = fg * fg.a + bg * bg.a * (1 - fg.a), normalized by the output alpha.
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    if foreground[3] == 0 {
        return background;
    }
    if foreground[3] == 255 {
        return foreground;
    }

    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;
    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
