use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    assets::decode::DEFAULT_MAX_IMAGE_BYTES,
    foundation::error::CaptionResult,
    scene::model::{SubtitleStyle, WatermarkStyle},
};

/// Font file used instead of system fonts.
pub const FONT_ENV: &str = "CAPTIONBAND_FONT";
/// Font file used for bold subtitle text.
pub const BOLD_FONT_ENV: &str = "CAPTIONBAND_BOLD_FONT";
/// Encoded image size limit in bytes.
pub const MAX_IMAGE_BYTES_ENV: &str = "CAPTIONBAND_MAX_IMAGE_BYTES";

/// Style settings loaded from JSON.
///
/// Every field is optional in the file; missing fields take the reset defaults
/// (white subtitles with a 4px black outline, white watermark at 0.8 opacity).
///
/// ```json
/// {
///   "subtitle": { "color": "#ffff00", "stroke_color": "#000000", "stroke_width": 3 },
///   "watermark": { "color": "#ffffff", "opacity": 0.5 },
///   "font": "fonts/NotoSansSC-Bold.otf"
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    pub subtitle: SubtitleStyle,
    pub watermark: WatermarkStyle,
    /// Relative paths are resolved against the config file's directory by [`StyleConfig::from_path`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    /// Bold face for subtitles. Without it the subtitle face is `font` at its own weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold_font: Option<PathBuf>,
}

impl StyleConfig {
    pub fn from_json_str(json: &str) -> CaptionResult<Self> {
        let cfg: Self = serde_json::from_str(json).context("parse style config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> CaptionResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read style config '{}'", path.display()))?;
        let mut cfg: Self = serde_json::from_str(&json)
            .with_context(|| format!("parse style config '{}'", path.display()))?;
        cfg.validate()?;
        if let Some(dir) = path.parent() {
            for font in [cfg.font.as_mut(), cfg.bold_font.as_mut()].into_iter().flatten() {
                if font.is_relative() {
                    *font = dir.join(&*font);
                }
            }
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> CaptionResult<()> {
        self.subtitle.validate()?;
        self.watermark.validate()
    }

    /// Environment values take precedence over the file.
    pub fn apply_env(&mut self, env: &EnvOverrides) {
        if let Some(font) = &env.font {
            self.font = Some(font.clone());
        }
        if let Some(font) = &env.bold_font {
            self.bold_font = Some(font.clone());
        }
    }
}

/// Settings read from `CAPTIONBAND_*` environment variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub font: Option<PathBuf>,
    pub bold_font: Option<PathBuf>,
    pub max_image_bytes: Option<u64>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty, unparsable and zero values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        let max_image_bytes = lookup(MAX_IMAGE_BYTES_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&n| n > 0);
        Self {
            font: path(FONT_ENV),
            bold_font: path(BOLD_FONT_ENV),
            max_image_bytes,
        }
    }

    pub fn max_image_bytes_or_default(&self) -> u64 {
        self.max_image_bytes.unwrap_or(DEFAULT_MAX_IMAGE_BYTES)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
