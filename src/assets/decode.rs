use std::sync::Arc;

use crate::foundation::error::{CaptionError, CaptionResult};

/// Default cap on encoded input size (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Decoded source image in premultiplied RGBA8 form. Never mutated after decode.
#[derive(Clone)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba8_premul.len())
            .finish()
    }
}

impl SourceImage {
    /// Build from straight-alpha RGBA8 pixels.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> CaptionResult<Self> {
        if width == 0 || height == 0 {
            return Err(CaptionError::validation(format!(
                "image dimensions must be positive, got {width}x{height}"
            )));
        }
        if rgba8.len() != width as usize * height as usize * 4 {
            return Err(CaptionError::validation("rgba8 byte length mismatch"));
        }
        premultiply_rgba8_in_place(&mut rgba8);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major premultiplied RGBA8.
    pub fn rgba8_premul(&self) -> &[u8] {
        self.rgba8_premul.as_slice()
    }

    /// True when both handles share one pixel buffer (clones of the same decode).
    pub(crate) fn shares_pixels_with(&self, other: &SourceImage) -> bool {
        Arc::ptr_eq(&self.rgba8_premul, &other.rgba8_premul)
    }
}

/// Decode encoded image bytes with the default size limit.
pub fn decode_image(bytes: &[u8]) -> CaptionResult<SourceImage> {
    decode_image_with_limit(bytes, DEFAULT_MAX_IMAGE_BYTES)
}

/// Decode encoded image bytes, rejecting inputs longer than `max_bytes` before decoding.
pub fn decode_image_with_limit(bytes: &[u8], max_bytes: u64) -> CaptionResult<SourceImage> {
    let len = bytes.len() as u64;
    if len > max_bytes {
        return Err(CaptionError::ImageTooLarge {
            len,
            limit: max_bytes,
        });
    }

    let format = image::guess_format(bytes)?;
    let dyn_img = image::load_from_memory_with_format(bytes, format)?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    SourceImage::from_rgba8(width, height, rgba.into_raw())
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
