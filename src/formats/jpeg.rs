use crate::error::WatermarkError;
use image::{DynamicImage, ImageEncoder, codecs::jpeg::JpegEncoder};

pub const DEFAULT_QUALITY: u8 = 95;

/// Encode as baseline JPEG. JPEG has no alpha channel, so the image is converted to RGB.
pub fn encode(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, WatermarkError> {
    let rgb_image = image.to_rgb8();
    let mut output = Vec::new();

    let encoder = JpegEncoder::new_with_quality(&mut output, quality);
    encoder.write_image(
        &rgb_image,
        rgb_image.width(),
        rgb_image.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    Ok(output)
}
