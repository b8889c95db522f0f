use std::io::Cursor;

use anyhow::Context;

use crate::foundation::error::{CaptionError, CaptionResult};

/// A rendered image as RGBA8 pixels.
///
/// Frames coming out of [`crate::CpuSurface`] are premultiplied; `premultiplied` makes that
/// explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` as stored.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }
}

/// Serialize a frame into an encoded image (PNG, JPEG, ...).
///
/// Formats without an alpha channel receive the straight RGB channels.
pub fn encode_frame(frame: &FrameRGBA, format: image::ImageFormat) -> CaptionResult<Vec<u8>> {
    let rgba = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
        .ok_or_else(|| CaptionError::render("frame byte length does not match its dimensions"))?;
    let dyn_img = image::DynamicImage::ImageRgba8(rgba);
    let dyn_img = match format {
        image::ImageFormat::Jpeg | image::ImageFormat::Bmp => {
            image::DynamicImage::ImageRgb8(dyn_img.to_rgb8())
        }
        _ => dyn_img,
    };

    let mut buf = Vec::new();
    dyn_img
        .write_to(&mut Cursor::new(&mut buf), format)
        .with_context(|| format!("encode frame as {format:?}"))?;
    Ok(buf)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
