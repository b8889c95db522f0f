use std::{borrow::Cow, sync::Arc};

use crate::{
    assets::decode::SourceImage,
    assets::fonts::{FontFace, FontSet},
    foundation::core::{Point, Rect, Rgba8},
    foundation::error::{CaptionError, CaptionResult},
    render::frame::FrameRGBA,
    render::surface::{RasterSurface, TextAlign, TextBaseline, TextStyle},
};

/// CPU raster surface backed by `vello_cpu`, with text shaped by `parley`.
///
/// Text draws need a [`FontSet`]; a surface built without one can still blit and stroke lines
/// but returns [`CaptionError::Font`] for any text.
pub struct CpuSurface {
    target: Option<CpuTarget>,
    fonts: Option<TextShaper>,
    /// Paint for the most recently blitted image. Holding the image keeps its buffer alive.
    image_cache: Option<(SourceImage, vello_cpu::Image)>,
    global_alpha: f32,
}

struct CpuTarget {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
}

#[derive(Clone, Copy)]
enum TextPaint {
    Fill,
    Stroke(f64),
}

impl CpuSurface {
    pub fn new(fonts: Option<&FontSet>) -> CaptionResult<Self> {
        let fonts = fonts.map(TextShaper::new).transpose()?;
        Ok(Self {
            target: None,
            fonts,
            image_cache: None,
            global_alpha: 1.0,
        })
    }

    /// Surface that cannot draw text.
    pub fn without_fonts() -> Self {
        Self {
            target: None,
            fonts: None,
            image_cache: None,
            global_alpha: 1.0,
        }
    }

    pub fn has_fonts(&self) -> bool {
        self.fonts.is_some()
    }

    /// Rasterize everything drawn since the last `reset` into a premultiplied frame.
    pub fn to_frame(&mut self) -> CaptionResult<FrameRGBA> {
        let target = self
            .target
            .as_mut()
            .ok_or_else(|| CaptionError::render("surface was never reset to a size"))?;

        let mut pixmap = vello_cpu::Pixmap::new(target.width, target.height);
        target.ctx.flush();
        target.ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: u32::from(target.width),
            height: u32::from(target.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn target_mut(&mut self) -> CaptionResult<&mut CpuTarget> {
        self.target
            .as_mut()
            .ok_or_else(|| CaptionError::render("surface was never reset to a size"))
    }

    fn image_paint_for(&mut self, image: &SourceImage) -> CaptionResult<vello_cpu::Image> {
        if let Some((cached, paint)) = &self.image_cache
            && cached.shares_pixels_with(image)
        {
            return Ok(paint.clone());
        }

        let pixmap =
            image_premul_bytes_to_pixmap(image.rgba8_premul(), image.width(), image.height())?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache = Some((image.clone(), paint.clone()));
        Ok(paint)
    }

    fn draw_text(
        &mut self,
        text: &str,
        anchor: Point,
        style: &TextStyle,
        color: Rgba8,
        paint: TextPaint,
    ) -> CaptionResult<()> {
        let shaper = self
            .fonts
            .as_mut()
            .ok_or_else(|| CaptionError::font("no fonts configured for this surface"))?;
        let shaped = shaper.layout(text, style)?;
        let alpha = self.global_alpha;
        let target = self
            .target
            .as_mut()
            .ok_or_else(|| CaptionError::render("surface was never reset to a size"))?;

        let origin = text_origin(anchor, style, &TextExtent::of(&shaped.layout));
        let ctx = &mut target.ctx;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        ctx.set_paint(to_cpu_color(color));
        if let TextPaint::Stroke(width) = paint {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        }

        draw_blended(ctx, alpha, |ctx| {
            for line in shaped.layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };

                    let font = vello_cpu::peniko::FontData::new(
                        shaped.blob.clone(),
                        run.run().font().index,
                    );
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    let builder = ctx.glyph_run(&font).font_size(run.run().font_size());
                    match paint {
                        TextPaint::Fill => builder.fill_glyphs(glyphs),
                        TextPaint::Stroke(_) => builder.stroke_glyphs(glyphs),
                    }
                }
            }
        });

        Ok(())
    }
}

impl RasterSurface for CpuSurface {
    fn reset(&mut self, width: u32, height: u32) -> CaptionResult<()> {
        if width == 0 || height == 0 {
            return Err(CaptionError::render("surface dimensions must be positive"));
        }
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| CaptionError::render("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| CaptionError::render("surface height exceeds u16"))?;

        self.target = Some(CpuTarget {
            width: width_u16,
            height: height_u16,
            ctx: vello_cpu::RenderContext::new(width_u16, height_u16),
        });
        self.global_alpha = 1.0;
        Ok(())
    }

    fn blit(&mut self, image: &SourceImage, src: Rect, dst: Rect) -> CaptionResult<()> {
        if src.width() <= 0.0 || src.height() <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0
        {
            return Ok(());
        }

        let paint = self.image_paint_for(image)?;
        let scale_x = dst.width() / src.width();
        let scale_y = dst.height() / src.height();
        let map = kurbo::Affine::translate((dst.x0, dst.y0))
            * kurbo::Affine::scale_non_uniform(scale_x, scale_y)
            * kurbo::Affine::translate((-src.x0, -src.y0));

        let alpha = self.global_alpha;
        let ctx = &mut self.target_mut()?.ctx;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(map));
        ctx.set_paint(paint);
        draw_blended(ctx, alpha, |ctx| ctx.fill_rect(&rect_to_cpu(src)));
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgba8,
        width: f64,
    ) -> CaptionResult<()> {
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(from));
        path.line_to(point_to_cpu(to));

        let alpha = self.global_alpha;
        let ctx = &mut self.target_mut()?.ctx;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        ctx.set_paint(to_cpu_color(color));
        draw_blended(ctx, alpha, |ctx| ctx.stroke_path(&path));
        Ok(())
    }

    fn stroke_text(
        &mut self,
        text: &str,
        anchor: Point,
        style: &TextStyle,
        color: Rgba8,
        width: f64,
    ) -> CaptionResult<()> {
        self.draw_text(text, anchor, style, color, TextPaint::Stroke(width))
    }

    fn fill_text(
        &mut self,
        text: &str,
        anchor: Point,
        style: &TextStyle,
        color: Rgba8,
    ) -> CaptionResult<()> {
        self.draw_text(text, anchor, style, color, TextPaint::Fill)
    }

    fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }
}

/// Blend a single draw call at `alpha`, isolated from every other draw.
fn draw_blended(
    ctx: &mut vello_cpu::RenderContext,
    alpha: f32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if alpha >= 1.0 {
        draw(ctx);
        return;
    }
    ctx.push_opacity_layer(alpha);
    draw(ctx);
    ctx.pop_layer();
}

/// Horizontal advance and first-line vertical metrics of a shaped layout.
///
/// `baseline` is measured from the layout top and includes any leading above the line.
/// `descent` is positive below the baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct TextExtent {
    width: f64,
    baseline: f64,
    ascent: f64,
    descent: f64,
}

impl TextExtent {
    fn of(layout: &parley::Layout<()>) -> Self {
        let width = f64::from(layout.width());
        let Some(line) = layout.lines().next() else {
            return Self {
                width,
                ..Self::default()
            };
        };
        let m = line.metrics();
        Self {
            width,
            baseline: f64::from(m.baseline),
            ascent: f64::from(m.ascent),
            descent: f64::from(m.descent.abs()),
        }
    }
}

/// Layout origin that puts the em box of the first line against `anchor`.
fn text_origin(anchor: Point, style: &TextStyle, extent: &TextExtent) -> Point {
    let x = match style.align {
        TextAlign::Left => anchor.x,
        TextAlign::Center => anchor.x - extent.width / 2.0,
        TextAlign::Right => anchor.x - extent.width,
    };
    let y = match style.baseline {
        TextBaseline::Top => anchor.y - extent.baseline + extent.ascent,
        TextBaseline::Middle => {
            anchor.y - extent.baseline + (extent.ascent - extent.descent) / 2.0
        }
    };
    Point::new(x, y)
}

/// Parley contexts for the bold and regular faces. Each face gets its own font context so a
/// layout can only ever resolve to that face's bytes.
struct TextShaper {
    bold: ShapingFace,
    regular: ShapingFace,
    layout_ctx: parley::LayoutContext<()>,
}

struct ShapingFace {
    font_ctx: parley::FontContext,
    family: String,
    blob: vello_cpu::peniko::Blob<u8>,
}

struct ShapedText {
    layout: parley::Layout<()>,
    blob: vello_cpu::peniko::Blob<u8>,
}

impl ShapingFace {
    fn new(face: &FontFace) -> CaptionResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.bytes().to_vec()), None);
        if families.is_empty() {
            return Err(CaptionError::font(format!(
                "no font families registered for '{}'",
                face.family()
            )));
        }

        let mut names = Vec::with_capacity(families.len());
        for (id, _) in &families {
            if let Some(name) = font_ctx.collection.family_name(*id) {
                names.push(name.to_string());
            }
        }
        let family = names
            .iter()
            .find(|n| n.as_str() == face.family())
            .or_else(|| names.first())
            .cloned()
            .ok_or_else(|| CaptionError::font("registered font family has no name"))?;

        Ok(Self {
            font_ctx,
            family,
            blob: vello_cpu::peniko::Blob::from(face.bytes().to_vec()),
        })
    }
}

impl TextShaper {
    fn new(fonts: &FontSet) -> CaptionResult<Self> {
        Ok(Self {
            bold: ShapingFace::new(&fonts.bold)?,
            regular: ShapingFace::new(&fonts.regular)?,
            layout_ctx: parley::LayoutContext::new(),
        })
    }

    fn layout(&mut self, text: &str, style: &TextStyle) -> CaptionResult<ShapedText> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(CaptionError::validation("text size_px must be finite and > 0"));
        }

        let face = if style.bold {
            &mut self.bold
        } else {
            &mut self.regular
        };
        let weight = if style.bold {
            parley::style::FontWeight::BOLD
        } else {
            parley::style::FontWeight::NORMAL
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut face.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        Ok(ShapedText {
            layout,
            blob: face.blob.clone(),
        })
    }
}

fn to_cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CaptionResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CaptionError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CaptionError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CaptionError::render("source image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
