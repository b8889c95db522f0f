use serde::{Deserialize, Serialize};

use crate::{
    foundation::core::Rgba8,
    foundation::error::{CaptionError, CaptionResult},
};

/// Split raw subtitle input into display lines: one per `\n`, trimmed, blanks dropped, order kept.
pub fn split_subtitle_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Subtitle text styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubtitleStyle {
    pub color: Rgba8,
    pub stroke_color: Rgba8,
    /// Outline width in px; `0` disables the outline.
    pub stroke_width: f32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::WHITE,
            stroke_color: Rgba8::BLACK,
            stroke_width: 4.0,
        }
    }
}

impl SubtitleStyle {
    pub fn validate(&self) -> CaptionResult<()> {
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(CaptionError::invalid_style(format!(
                "subtitle stroke_width must be finite and >= 0, got {}",
                self.stroke_width
            )));
        }
        Ok(())
    }
}

/// Ordered, non-empty subtitle lines plus their style.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubtitleSpec {
    lines: Vec<String>,
    pub style: SubtitleStyle,
}

impl SubtitleSpec {
    pub fn from_text(text: &str, style: SubtitleStyle) -> Self {
        Self {
            lines: split_subtitle_lines(text),
            style,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Watermark styling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkStyle {
    pub color: Rgba8,
    /// Global alpha applied to the whole watermark draw. Clamped to `[0, 1]` at render time.
    pub opacity: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::WHITE,
            opacity: 0.8,
        }
    }
}

impl WatermarkStyle {
    pub fn validate(&self) -> CaptionResult<()> {
        if !self.opacity.is_finite() {
            return Err(CaptionError::invalid_style(
                "watermark opacity must be a finite number",
            ));
        }
        Ok(())
    }

    pub fn effective_opacity(&self) -> f32 {
        self.opacity.clamp(0.0, 1.0)
    }
}

/// Optional single-line watermark. Whitespace-only text disables it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WatermarkSpec {
    text: String,
    pub style: WatermarkStyle,
}

impl WatermarkSpec {
    pub fn new(text: &str, style: WatermarkStyle) -> Self {
        Self {
            text: text.trim().to_owned(),
            style,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
