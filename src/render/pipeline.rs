use serde::Serialize;

use crate::{
    assets::decode::SourceImage,
    foundation::core::Rect,
    foundation::error::{CaptionError, CaptionResult},
    layout::plan::LayoutPlan,
    render::compositor::draw_layered_subtitles,
    render::cpu::CpuSurface,
    render::frame::FrameRGBA,
    render::surface::RasterSurface,
    render::watermark::{WatermarkPlacement, draw_watermark},
    scene::model::{SubtitleSpec, WatermarkSpec},
};

/// What a render decided, alongside the pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RenderReport {
    pub plan: LayoutPlan,
    /// `None` when there was no watermark text or the image was too short to hold it.
    pub watermark: Option<WatermarkPlacement>,
}

/// Draw `image` with its subtitle bands and watermark onto `surface`.
///
/// Inputs are validated before the surface is touched, so a rejected render leaves whatever the
/// surface held before. Identical inputs always produce identical draw calls.
///
/// Steps:
/// 1. Compute the [`LayoutPlan`] and resize/clear the surface to its canvas size.
/// 2. Draw the unmodified image at the origin.
/// 3. Draw one band per subtitle line ([`draw_layered_subtitles`]).
/// 4. Overlay the watermark ([`draw_watermark`]).
#[tracing::instrument(skip_all, fields(lines = subtitle.lines().len()))]
pub fn render_into<S: RasterSurface + ?Sized>(
    surface: &mut S,
    image: Option<&SourceImage>,
    subtitle: &SubtitleSpec,
    watermark: &WatermarkSpec,
) -> CaptionResult<RenderReport> {
    let image = image.ok_or(CaptionError::NoImageLoaded)?;
    subtitle.style.validate()?;
    watermark.style.validate()?;

    let plan = LayoutPlan::compute(image.width(), image.height(), subtitle.lines().len())?;
    let (canvas_w, canvas_h) = plan.canvas_px();
    tracing::debug!(
        canvas_w,
        canvas_h,
        font_size = plan.font_size,
        band_height = plan.band_height,
        "layout plan"
    );

    surface.reset(canvas_w, canvas_h)?;

    let full = Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height()));
    surface.blit(image, full, full)?;

    draw_layered_subtitles(surface, image, &plan, subtitle.lines(), &subtitle.style)?;
    let watermark = draw_watermark(surface, image.width(), image.height(), watermark)?;

    Ok(RenderReport { plan, watermark })
}

/// Render through a CPU surface and read back the finished frame.
pub fn render(
    surface: &mut CpuSurface,
    image: Option<&SourceImage>,
    subtitle: &SubtitleSpec,
    watermark: &WatermarkSpec,
) -> CaptionResult<(FrameRGBA, RenderReport)> {
    let report = render_into(surface, image, subtitle, watermark)?;
    let frame = surface.to_frame()?;
    Ok((frame, report))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
