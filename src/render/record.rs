use serde::Serialize;

use crate::{
    assets::decode::SourceImage,
    foundation::core::{Point, Rect, Rgba8},
    foundation::error::{CaptionError, CaptionResult},
    render::surface::{RasterSurface, TextStyle},
};

/// One recorded draw call. `alpha` is the global alpha in effect when the call was made.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Reset {
        width: u32,
        height: u32,
    },
    Blit {
        image_width: u32,
        image_height: u32,
        src: Rect,
        dst: Rect,
        alpha: f32,
    },
    StrokeLine {
        from: Point,
        to: Point,
        color: Rgba8,
        width: f64,
        alpha: f32,
    },
    StrokeText {
        text: String,
        anchor: Point,
        style: TextStyle,
        color: Rgba8,
        width: f64,
        alpha: f32,
    },
    FillText {
        text: String,
        anchor: Point,
        style: TextStyle,
        color: Rgba8,
        alpha: f32,
    },
}

/// Surface that records draw calls instead of rasterizing them.
///
/// Useful for inspecting layout decisions without fonts or pixels.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    alpha: f32,
    size: Option<(u32, u32)>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            alpha: 1.0,
            size: None,
        }
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Size set by the last `reset`.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }
}

impl RasterSurface for RecordingSurface {
    fn reset(&mut self, width: u32, height: u32) -> CaptionResult<()> {
        if width == 0 || height == 0 {
            return Err(CaptionError::render("surface dimensions must be positive"));
        }
        self.commands.clear();
        self.alpha = 1.0;
        self.size = Some((width, height));
        self.commands.push(DrawCommand::Reset { width, height });
        Ok(())
    }

    fn blit(&mut self, image: &SourceImage, src: Rect, dst: Rect) -> CaptionResult<()> {
        let alpha = self.global_alpha();
        self.commands.push(DrawCommand::Blit {
            image_width: image.width(),
            image_height: image.height(),
            src,
            dst,
            alpha,
        });
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: Point,
        to: Point,
        color: Rgba8,
        width: f64,
    ) -> CaptionResult<()> {
        let alpha = self.global_alpha();
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            color,
            width,
            alpha,
        });
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
        let alpha = self.global_alpha();
        self.commands.push(DrawCommand::StrokeText {
            text: text.to_owned(),
            anchor,
            style: *style,
            color,
            width,
            alpha,
        });
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        anchor: Point,
        style: &TextStyle,
        color: Rgba8,
    ) -> CaptionResult<()> {
        let alpha = self.global_alpha();
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            anchor,
            style: *style,
            color,
            alpha,
        });
        Ok(())
    }

    fn global_alpha(&self) -> f32 {
        self.alpha
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/record.rs"]
mod tests;
