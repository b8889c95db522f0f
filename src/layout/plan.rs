use serde::Serialize;

use crate::{
    foundation::core::Rect,
    foundation::error::{CaptionError, CaptionResult},
    layout::canvas::{CanvasSize, canvas_dimensions},
    layout::sizing::{band_height, min_dimension, subtitle_font_size},
};

/// Per-render geometry derived from the image size and the subtitle line count.
///
/// Plans are cheap and always recomputed from the current inputs; nothing caches them across
/// renders.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LayoutPlan {
    pub image_width: u32,
    pub image_height: u32,
    pub line_count: usize,
    /// Subtitle font size in px.
    pub font_size: u32,
    pub band_height: f64,
    pub canvas: CanvasSize,
}

impl LayoutPlan {
    pub fn compute(image_width: u32, image_height: u32, line_count: usize) -> CaptionResult<Self> {
        if image_width == 0 || image_height == 0 {
            return Err(CaptionError::validation(format!(
                "image dimensions must be positive, got {image_width}x{image_height}"
            )));
        }

        let font_size = subtitle_font_size(min_dimension(image_width, image_height));
        let band_height = band_height(image_height, font_size);
        if !band_height.is_finite() || band_height <= 0.0 {
            return Err(CaptionError::validation("band height must be finite and > 0"));
        }
        let canvas = canvas_dimensions(image_width, image_height, line_count, band_height);

        Ok(Self {
            image_width,
            image_height,
            line_count,
            font_size,
            band_height,
            canvas,
        })
    }

    pub fn canvas_px(&self) -> (u32, u32) {
        self.canvas.to_px()
    }

    /// Source strip reused as every band's background: the bottom-most `band_height` rows of the
    /// image, or the whole image when it is shorter than one band.
    pub fn crop_rect(&self) -> Rect {
        let h = f64::from(self.image_height);
        let source_y = (h - self.band_height).max(0.0);
        let source_h = self.band_height.min(h - source_y);
        Rect::new(0.0, source_y, f64::from(self.image_width), source_y + source_h)
    }

    /// Top edge of band `index`. Band 0 overwrites the image's bottom strip in place; later bands
    /// stack below the image with no gaps.
    pub fn band_top(&self, index: usize) -> f64 {
        let h = f64::from(self.image_height);
        if index == 0 {
            h - self.band_height
        } else {
            h + (index - 1) as f64 * self.band_height
        }
    }

    pub fn band_rect(&self, index: usize) -> Rect {
        let top = self.band_top(index);
        Rect::new(0.0, top, f64::from(self.canvas.width), top + self.band_height)
    }

    pub fn band_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        (0..self.line_count).map(|i| self.band_rect(i))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/plan.rs"]
mod tests;
