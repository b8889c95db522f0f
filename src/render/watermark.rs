use serde::Serialize;

use crate::{
    foundation::core::{Point, Rgba8},
    foundation::error::CaptionResult,
    layout::sizing::{min_dimension, watermark_font_size},
    render::surface::{OpacityScope, RasterSurface, TextAlign, TextBaseline, TextStyle},
    scene::model::WatermarkSpec,
};

pub const WATERMARK_MARGIN_RATIO: f64 = 0.6;
pub const WATERMARK_STROKE_WIDTH: f64 = 2.0;
pub const WATERMARK_STROKE_ALPHA: f32 = 0.7;

pub fn watermark_stroke_color() -> Rgba8 {
    Rgba8::BLACK.with_alpha_f32(WATERMARK_STROKE_ALPHA)
}

/// Where the watermark goes inside the original image region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WatermarkPlacement {
    pub font_size: u32,
    pub margin: f64,
    /// Top-right corner of the text box.
    pub anchor: Point,
    /// False when the image is too short to hold the watermark clear of its bottom edge.
    pub visible: bool,
}

impl WatermarkPlacement {
    pub fn compute(image_width: u32, image_height: u32) -> Self {
        let font_size = watermark_font_size(min_dimension(image_width, image_height));
        let margin = f64::from(font_size) * WATERMARK_MARGIN_RATIO;
        let anchor = Point::new(f64::from(image_width) - margin, margin);
        let visible = fits_above_bottom(anchor.y, f64::from(image_height), f64::from(font_size));
        Self {
            font_size,
            margin,
            anchor,
            visible,
        }
    }

    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            size_px: self.font_size as f32,
            bold: false,
            align: TextAlign::Right,
            baseline: TextBaseline::Top,
        }
    }
}

/// The watermark is drawn only when its top edge sits strictly above `image_height - font_size`.
pub fn fits_above_bottom(y: f64, image_height: f64, font_size: f64) -> bool {
    y < image_height - font_size
}

/// Overlay the watermark in the top-right corner of the original image region.
///
/// The outline and the fill are each blended at the watermark opacity, so a translucent outline
/// still shows under the fill. Global alpha is back to its previous value when this returns, on
/// every path.
pub fn draw_watermark<S: RasterSurface + ?Sized>(
    surface: &mut S,
    image_width: u32,
    image_height: u32,
    spec: &WatermarkSpec,
) -> CaptionResult<Option<WatermarkPlacement>> {
    if spec.is_empty() {
        return Ok(None);
    }

    let placement = WatermarkPlacement::compute(image_width, image_height);
    let mut scoped = OpacityScope::new(surface, spec.style.effective_opacity());

    if !placement.visible {
        tracing::debug!(
            image_width,
            image_height,
            font_size = placement.font_size,
            "watermark skipped: image too short"
        );
        return Ok(None);
    }

    let style = placement.text_style();
    scoped.stroke_text(
        spec.text(),
        placement.anchor,
        &style,
        watermark_stroke_color(),
        WATERMARK_STROKE_WIDTH,
    )?;
    scoped.fill_text(spec.text(), placement.anchor, &style, spec.style.color)?;

    Ok(Some(placement))
}

#[cfg(test)]
#[path = "../../tests/unit/render/watermark.rs"]
mod tests;
