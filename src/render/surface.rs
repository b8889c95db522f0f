use std::ops::{Deref, DerefMut};

use serde::Serialize;

use crate::{
    assets::decode::SourceImage,
    foundation::core::{Point, Rect, Rgba8},
    foundation::error::CaptionResult,
};

/// Horizontal placement of a text box relative to its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Vertical placement of a text box relative to its anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextBaseline {
    Top,
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TextStyle {
    pub size_px: f32,
    pub bold: bool,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

/// A 2D drawing target.
///
/// Draw calls are applied in order. Each draw is blended on its own, with its color alpha
/// multiplied by the current global alpha. Prefer [`OpacityScope`] over setting it directly.
pub trait RasterSurface {
    /// Resize to `width x height` and clear to transparent.
    fn reset(&mut self, width: u32, height: u32) -> CaptionResult<()>;

    /// Draw the `src` region of `image` scaled to fill `dst`.
    fn blit(&mut self, image: &SourceImage, src: Rect, dst: Rect) -> CaptionResult<()>;

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgba8,
        width: f64,
    ) -> CaptionResult<()>;

    /// Outline `text` with a pen `width` px wide.
    fn stroke_text(
        &mut self,
        text: &str,
        anchor: Point,
        style: &TextStyle,
        color: Rgba8,
        width: f64,
    ) -> CaptionResult<()>;

    fn fill_text(
        &mut self,
        text: &str,
        anchor: Point,
        style: &TextStyle,
        color: Rgba8,
    ) -> CaptionResult<()>;

    /// Alpha multiplied into every following draw. `reset` restores it to 1.
    fn global_alpha(&self) -> f32;

    fn set_global_alpha(&mut self, alpha: f32);
}

/// Global alpha held for the lifetime of the guard.
///
/// The previous alpha is restored on drop, so every exit path (early returns and `?` included)
/// leaves later draws at the opacity they had before the scope opened.
pub struct OpacityScope<'s, S: RasterSurface + ?Sized> {
    surface: &'s mut S,
    previous: f32,
}

impl<'s, S: RasterSurface + ?Sized> OpacityScope<'s, S> {
    pub fn new(surface: &'s mut S, alpha: f32) -> Self {
        let previous = surface.global_alpha();
        surface.set_global_alpha(alpha.clamp(0.0, 1.0));
        Self { surface, previous }
    }
}

impl<S: RasterSurface + ?Sized> Deref for OpacityScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: RasterSurface + ?Sized> DerefMut for OpacityScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: RasterSurface + ?Sized> Drop for OpacityScope<'_, S> {
    fn drop(&mut self) {
        self.surface.set_global_alpha(self.previous);
    }
}
