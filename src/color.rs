use crate::error::WatermarkError;
use image::Rgba;
use tracing::{debug, warn};

/// Alpha applied when the expression names only the RGB channels.
pub const DEFAULT_ALPHA: u8 = 128;

/// Color used when nothing in the expression can be understood.
pub const FALLBACK_COLOR: Rgba<u8> = Rgba([0, 0, 0, DEFAULT_ALPHA]);

const PALETTE: [(&str, [u8; 3]); 8] = [
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("gray", [128, 128, 128]),
    ("silver", [192, 192, 192]),
];

/// Resolve a color expression into RGBA.
///
/// Accepts a palette name, `#RRGGBB`, `r,g,b` or `r,g,b,a`. Anything else
/// resolves to [`FALLBACK_COLOR`] instead of failing.
pub fn parse_color(expr: &str) -> Rgba<u8> {
    match try_parse(expr) {
        Some(color) => color,
        None => {
            warn!(
                "Unrecognized color {:?}, using {:?}",
                expr, FALLBACK_COLOR.0
            );
            FALLBACK_COLOR
        }
    }
}

/// Same grammar as [`parse_color`], but rejects what it cannot parse.
pub fn parse_color_strict(expr: &str) -> Result<Rgba<u8>, WatermarkError> {
    try_parse(expr).ok_or_else(|| WatermarkError::InvalidColor(expr.to_string()))
}

fn try_parse(expr: &str) -> Option<Rgba<u8>> {
    let expr = expr.trim().to_lowercase();

    if let Some(rgb) = palette_lookup(&expr) {
        debug!("Color {:?} resolved from palette", expr);
        return Some(with_default_alpha(rgb));
    }

    if let Some(hex) = expr.strip_prefix('#')
        && let Some(rgb) = parse_hex(hex)
    {
        return Some(with_default_alpha(rgb));
    }

    if expr.contains(',') {
        return parse_channel_list(&expr);
    }

    None
}

fn palette_lookup(name: &str) -> Option<[u8; 3]> {
    PALETTE
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, rgb)| *rgb)
}

/// Reads the first six hex digits; anything after them is ignored.
fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.get(0..6)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some([r, g, b])
}

fn parse_channel_list(expr: &str) -> Option<Rgba<u8>> {
    let channels = expr
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    match channels.as_slice() {
        [r, g, b] => Some(with_default_alpha([*r, *g, *b])),
        [r, g, b, a] => Some(Rgba([*r, *g, *b, *a])),
        _ => None,
    }
}

fn with_default_alpha([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, DEFAULT_ALPHA])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_names() {
        assert_eq!(parse_color("red"), Rgba([255, 0, 0, 128]));
        assert_eq!(parse_color("Silver"), Rgba([192, 192, 192, 128]));
        assert_eq!(parse_color("  WHITE "), Rgba([255, 255, 255, 128]));
        assert_eq!(parse_color("gray"), Rgba([128, 128, 128, 128]));
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_color("#00FF00"), Rgba([0, 255, 0, 128]));
        assert_eq!(parse_color("#1a2b3c"), Rgba([0x1a, 0x2b, 0x3c, 128]));
        // Trailing digits past the RGB triple are ignored
        assert_eq!(parse_color("#ff000080"), Rgba([255, 0, 0, 128]));
    }

    #[test]
    fn test_malformed_hex_falls_through() {
        assert_eq!(parse_color("#FFF"), FALLBACK_COLOR);
        assert_eq!(parse_color("#GG0000"), FALLBACK_COLOR);
        assert_eq!(parse_color("#+f0000"), FALLBACK_COLOR);
    }

    #[test]
    fn test_channel_lists() {
        assert_eq!(parse_color("10,20,30,40"), Rgba([10, 20, 30, 40]));
        assert_eq!(parse_color("10, 20, 30"), Rgba([10, 20, 30, 128]));
        assert_eq!(parse_color("255,255,255,128"), Rgba([255, 255, 255, 128]));
    }

    #[test]
    fn test_bad_channel_lists_default() {
        assert_eq!(parse_color("1,2"), FALLBACK_COLOR);
        assert_eq!(parse_color("1,2,3,4,5"), FALLBACK_COLOR);
        assert_eq!(parse_color("1,two,3"), FALLBACK_COLOR);
        assert_eq!(parse_color("300,0,0"), FALLBACK_COLOR);
        assert_eq!(parse_color("-1,0,0"), FALLBACK_COLOR);
    }

    #[test]
    fn test_unknown_defaults_to_translucent_black() {
        assert_eq!(parse_color("not-a-color"), Rgba([0, 0, 0, 128]));
        assert_eq!(parse_color(""), FALLBACK_COLOR);
    }

    #[test]
    fn test_strict_mode() {
        assert_eq!(parse_color_strict("blue").unwrap(), Rgba([0, 0, 255, 128]));
        assert_eq!(
            parse_color_strict("1,2,3,4").unwrap(),
            Rgba([1, 2, 3, 4])
        );

        let err = parse_color_strict("not-a-color").unwrap_err();
        assert!(matches!(err, WatermarkError::InvalidColor(ref s) if s == "not-a-color"));
        assert!(parse_color_strict("#12").is_err());
    }
}
