use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::{
    assets::decode::{DEFAULT_MAX_IMAGE_BYTES, SourceImage, decode_image_with_limit},
    foundation::error::{CaptionError, CaptionResult},
    render::cpu::CpuSurface,
    render::frame::{FrameRGBA, encode_frame},
    render::pipeline::{RenderReport, render},
    scene::model::{SubtitleSpec, SubtitleStyle, WatermarkSpec, WatermarkStyle},
};

/// Facts about the currently loaded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Size of the encoded input.
    pub byte_len: u64,
}

impl ImageInfo {
    pub fn display_size(&self) -> String {
        format_file_size(self.byte_len)
    }
}

/// Human readable byte count: `0 Bytes`, `1.5 KB`, `1 MB`.
///
/// Values are rounded to two decimals with trailing zeros dropped. Units stop at GB.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0usize;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

struct LoadedImage {
    image: SourceImage,
    byte_len: u64,
}

/// Interactive editing state: one image, its subtitle and watermark settings, and the most
/// recent render.
///
/// Every fallible operation is all-or-nothing. A rejected load keeps the previous image, and
/// a rejected render keeps the previous frame.
pub struct Session {
    surface: CpuSurface,
    max_image_bytes: u64,
    image: Option<LoadedImage>,
    subtitle: SubtitleSpec,
    watermark: WatermarkSpec,
    last: Option<(FrameRGBA, RenderReport)>,
    stale: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("max_image_bytes", &self.max_image_bytes)
            .field("image", &self.image_info())
            .field("subtitle", &self.subtitle)
            .field("watermark", &self.watermark)
            .field("has_frame", &self.last.is_some())
            .field("stale", &self.stale)
            .finish()
    }
}

impl Session {
    pub fn new(surface: CpuSurface) -> Self {
        Self {
            surface,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            image: None,
            subtitle: SubtitleSpec::default(),
            watermark: WatermarkSpec::default(),
            last: None,
            stale: true,
        }
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_bytes
    }

    /// Decode and adopt a new image. On success the previous frame is discarded.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> CaptionResult<ImageInfo> {
        let image = decode_image_with_limit(bytes, self.max_image_bytes)?;
        let info = ImageInfo {
            width: image.width(),
            height: image.height(),
            byte_len: bytes.len() as u64,
        };
        tracing::info!(
            width = info.width,
            height = info.height,
            size = %info.display_size(),
            "image loaded"
        );

        self.image = Some(LoadedImage {
            image,
            byte_len: info.byte_len,
        });
        self.last = None;
        self.stale = true;
        Ok(info)
    }

    pub fn load_image_path(&mut self, path: &Path) -> CaptionResult<ImageInfo> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        self.load_image_bytes(&bytes)
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref().map(|l| &l.image)
    }

    pub fn image_info(&self) -> Option<ImageInfo> {
        self.image.as_ref().map(|l| ImageInfo {
            width: l.image.width(),
            height: l.image.height(),
            byte_len: l.byte_len,
        })
    }

    pub fn subtitle(&self) -> &SubtitleSpec {
        &self.subtitle
    }

    pub fn watermark(&self) -> &WatermarkSpec {
        &self.watermark
    }

    pub fn set_subtitle_text(&mut self, text: &str) {
        self.subtitle = SubtitleSpec::from_text(text, self.subtitle.style.clone());
        self.stale = true;
    }

    pub fn set_subtitle_style(&mut self, style: SubtitleStyle) {
        self.subtitle.style = style;
        self.stale = true;
    }

    pub fn set_watermark_text(&mut self, text: &str) {
        self.watermark = WatermarkSpec::new(text, self.watermark.style.clone());
        self.stale = true;
    }

    pub fn set_watermark_style(&mut self, style: WatermarkStyle) {
        self.watermark.style = style;
        self.stale = true;
    }

    /// Whether the last frame no longer reflects the current inputs.
    pub fn is_stale(&self) -> bool {
        self.stale || self.last.is_none()
    }

    /// Render the current inputs, replacing the last frame on success.
    pub fn render(&mut self) -> CaptionResult<&FrameRGBA> {
        let image = self.image.as_ref().map(|l| &l.image);
        let out = render(&mut self.surface, image, &self.subtitle, &self.watermark)?;
        self.stale = false;
        let (frame, _) = self.last.insert(out);
        Ok(frame)
    }

    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.last.as_ref().map(|(frame, _)| frame)
    }

    pub fn last_report(&self) -> Option<&RenderReport> {
        self.last.as_ref().map(|(_, report)| report)
    }

    /// Encode the current composite, rendering first when the last frame is out of date.
    pub fn export(&mut self, format: image::ImageFormat) -> CaptionResult<Vec<u8>> {
        if self.image.is_none() {
            return Err(CaptionError::NoImageLoaded);
        }
        if self.is_stale() {
            self.render()?;
        }
        let (frame, _) = self
            .last
            .as_ref()
            .ok_or_else(|| CaptionError::render("no rendered frame to export"))?;
        encode_frame(frame, format)
    }

    /// Drop the image and the last frame and restore default text and styles.
    pub fn reset(&mut self) {
        self.image = None;
        self.subtitle = SubtitleSpec::default();
        self.watermark = WatermarkSpec::default();
        self.last = None;
        self.stale = true;
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
