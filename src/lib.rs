use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod color;
pub mod date;
pub mod driver;
pub mod error;
pub mod formats;
pub mod metadata;
pub mod source;
pub mod startup_checks;
pub mod watermark;

pub use driver::{BatchReport, FileFailure, FileOutcome, Pipeline};
pub use error::WatermarkError;
pub use watermark::{Anchor, WatermarkSpec};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: WatermarkConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    pub font_size: u32,
    pub color: String,
    pub position: String,
    /// Preferred font files, tried before the system fonts.
    pub fonts: Vec<PathBuf>,
    pub strict_color: bool,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            font_size: watermark::DEFAULT_FONT_SIZE,
            color: "255,255,255,128".to_string(),
            position: Anchor::default().name().to_string(),
            fonts: Vec::new(),
            strict_color: false,
        }
    }
}

impl Config {
    /// Load from a TOML file, or fall back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, WatermarkError> {
        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = toml_edit::de::from_str::<Config>(&content)
            .map_err(|e| WatermarkError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Configuration loaded from: {:?}", path);
        Ok(config)
    }

    /// Resolve the textual settings into the [`WatermarkSpec`] used for every image.
    pub fn watermark_spec(&self) -> Result<WatermarkSpec, WatermarkError> {
        let settings = &self.watermark;
        if settings.font_size == 0 {
            return Err(WatermarkError::Config(
                "font_size must be greater than zero".to_string(),
            ));
        }

        let color = if settings.strict_color {
            color::parse_color_strict(&settings.color)?
        } else {
            color::parse_color(&settings.color)
        };
        let anchor = Anchor::parse_lenient(&settings.position);

        Ok(WatermarkSpec::new(settings.font_size, color, anchor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_spec() {
        let spec = Config::default().watermark_spec().unwrap();
        assert_eq!(spec, WatermarkSpec::default());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(&temp.path().join("datemark.toml")).unwrap();
        assert_eq!(config.watermark.font_size, 24);
        assert_eq!(config.watermark.position, "bottom-right");
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("datemark.toml");
        std::fs::write(
            &path,
            "[watermark]\nfont_size = 48\ncolor = \"yellow\"\nfonts = [\"/fonts/a.ttf\"]\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.watermark.font_size, 48);
        assert_eq!(config.watermark.position, "bottom-right");
        assert_eq!(config.watermark.fonts, vec![PathBuf::from("/fonts/a.ttf")]);

        let spec = config.watermark_spec().unwrap();
        assert_eq!(spec.color, Rgba([255, 255, 0, 128]));
    }

    #[test]
    fn test_load_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("datemark.toml");
        std::fs::write(&path, "[watermark]\nfont_size = \"big\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(WatermarkError::Config(_))));
    }

    #[test]
    fn test_strict_color_rejects_garbage() {
        let mut config = Config::default();
        config.watermark.color = "not-a-color".to_string();
        assert_eq!(
            config.watermark_spec().unwrap().color,
            Rgba([0, 0, 0, 128])
        );

        config.watermark.strict_color = true;
        assert!(matches!(
            config.watermark_spec(),
            Err(WatermarkError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_zero_font_size_rejected() {
        let mut config = Config::default();
        config.watermark.font_size = 0;
        assert!(matches!(
            config.watermark_spec(),
            Err(WatermarkError::Config(_))
        ));
    }
}
