//! Font-size and band-height policy.
//!
//! Every function here is total over positive inputs and depends on nothing but its arguments,
//! so the same image dimensions always produce the same sizes.

/// A step in a font-size table: images whose min dimension is `<= upper` get `size_px`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontStep {
    pub upper: u32,
    pub size_px: u32,
}

const fn step(upper: u32, size_px: u32) -> FontStep {
    FontStep { upper, size_px }
}

/// Subtitle sizes by min dimension. Bounds are inclusive; anything above the last bound gets
/// [`SUBTITLE_FONT_MAX`].
pub const SUBTITLE_FONT_STEPS: [FontStep; 4] =
    [step(400, 32), step(600, 40), step(800, 48), step(1200, 56)];
pub const SUBTITLE_FONT_MAX: u32 = 64;

/// Watermark sizes, parallel to [`SUBTITLE_FONT_STEPS`] but smaller.
pub const WATERMARK_FONT_STEPS: [FontStep; 4] =
    [step(400, 24), step(600, 30), step(800, 36), step(1200, 42)];
pub const WATERMARK_FONT_MAX: u32 = 48;

/// Bands are always at least this many font sizes tall.
pub const BAND_FONT_RATIO: f64 = 2.5;

/// `min(width, height)`, used to pick a font bucket independent of orientation.
pub fn min_dimension(width: u32, height: u32) -> u32 {
    width.min(height)
}

fn lookup(steps: &[FontStep], max: u32, min_dim: u32) -> u32 {
    steps
        .iter()
        .find(|s| min_dim <= s.upper)
        .map(|s| s.size_px)
        .unwrap_or(max)
}

pub fn subtitle_font_size(min_dim: u32) -> u32 {
    lookup(&SUBTITLE_FONT_STEPS, SUBTITLE_FONT_MAX, min_dim)
}

pub fn watermark_font_size(min_dim: u32) -> u32 {
    lookup(&WATERMARK_FONT_STEPS, WATERMARK_FONT_MAX, min_dim)
}

/// Height of one subtitle band.
///
/// The base height shrinks relative to the image as the image grows (15%, 12%, then 10% with
/// floors of 80/100/120 px); the result never drops below `2.5 * font_size_px`.
pub fn band_height(image_height: u32, font_size_px: u32) -> f64 {
    let h = f64::from(image_height);
    let base = if image_height <= 400 {
        (h * 0.15).max(80.0)
    } else if image_height <= 800 {
        (h * 0.12).max(100.0)
    } else {
        (h * 0.10).max(120.0)
    };
    base.max(f64::from(font_size_px) * BAND_FONT_RATIO)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/sizing.rs"]
mod tests;
