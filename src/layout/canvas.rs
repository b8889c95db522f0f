use serde::Serialize;

/// Output canvas size. Height stays fractional because band heights are.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: f64,
}

impl CanvasSize {
    /// Whole-pixel size of the raster; fractional heights truncate.
    pub fn to_px(self) -> (u32, u32) {
        (self.width, self.height.max(0.0).floor() as u32)
    }
}

/// Canvas size for `line_count` subtitle lines.
///
/// The first line sits on the image's own bottom strip, so only lines after the first add height.
pub fn canvas_dimensions(
    image_width: u32,
    image_height: u32,
    line_count: usize,
    band_height: f64,
) -> CanvasSize {
    let additional = if line_count > 0 {
        (line_count - 1) as f64 * band_height
    } else {
        0.0
    };
    CanvasSize {
        width: image_width,
        height: f64::from(image_height) + additional,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/canvas.rs"]
mod tests;
