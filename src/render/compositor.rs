use crate::{
    assets::decode::SourceImage,
    foundation::core::{Point, Rgba8},
    foundation::error::CaptionResult,
    layout::plan::LayoutPlan,
    render::surface::{RasterSurface, TextAlign, TextBaseline, TextStyle},
    scene::model::SubtitleStyle,
};

pub const SEPARATOR_WIDTH: f64 = 2.0;
pub const SEPARATOR_ALPHA: f32 = 0.8;

pub fn separator_color() -> Rgba8 {
    Rgba8::WHITE.with_alpha_f32(SEPARATOR_ALPHA)
}

pub fn subtitle_text_style(plan: &LayoutPlan) -> TextStyle {
    TextStyle {
        size_px: plan.font_size as f32,
        bold: true,
        align: TextAlign::Center,
        baseline: TextBaseline::Middle,
    }
}

/// Draw one band per subtitle line on top of an already drawn base image.
///
/// Every band's background is the same bottom strip of `image` (see [`LayoutPlan::crop_rect`])
/// stretched over the band. Bands after the first get a separator on their top edge. Text is
/// centered in its band, outlined first when the stroke width is positive, then filled.
pub fn draw_layered_subtitles<S: RasterSurface + ?Sized>(
    surface: &mut S,
    image: &SourceImage,
    plan: &LayoutPlan,
    lines: &[String],
    style: &SubtitleStyle,
) -> CaptionResult<()> {
    if lines.is_empty() {
        return Ok(());
    }

    let crop = plan.crop_rect();
    let text_style = subtitle_text_style(plan);
    let canvas_width = f64::from(plan.canvas.width);

    for (index, line) in lines.iter().enumerate() {
        let band = plan.band_rect(index);
        surface.blit(image, crop, band)?;

        if index > 0 {
            surface.stroke_line(
                Point::new(0.0, band.y0),
                Point::new(canvas_width, band.y0),
                separator_color(),
                SEPARATOR_WIDTH,
            )?;
        }

        let anchor = Point::new(canvas_width / 2.0, band.y0 + plan.band_height / 2.0);
        if style.stroke_width > 0.0 {
            surface.stroke_text(
                line,
                anchor,
                &text_style,
                style.stroke_color,
                f64::from(style.stroke_width),
            )?;
        }
        surface.fill_text(line, anchor, &text_style, style.color)?;
    }

    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
