//! Captionband lays subtitle lines out as stacked bands cut from the bottom of a still image,
//! and stamps an optional watermark in its top-right corner.
//!
//! The layout is pure arithmetic on the image size and line count ([`LayoutPlan`]). Drawing goes
//! through the [`RasterSurface`] trait:
//!
//! - [`CpuSurface`] rasterizes with `vello_cpu` and shapes text with `parley`
//! - [`RecordingSurface`] records draw calls for inspection and tests
//!
//! [`Session`] wraps the pipeline with load, render and export state for interactive front ends.
#![forbid(unsafe_code)]

mod assets;
mod foundation;

pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod scene;

/// Style configuration files and environment overrides.
pub mod config;
/// Stateful load/render/export wrapper.
pub mod session;

pub use crate::foundation::core::{Point, Rect, Rgba8};
pub use crate::foundation::error::{CaptionError, CaptionResult};

pub use crate::assets::decode::{
    DEFAULT_MAX_IMAGE_BYTES, SourceImage, decode_image, decode_image_with_limit,
};
pub use crate::assets::fonts::{FontFace, FontSet, PREFERRED_FAMILY};
pub use crate::config::{EnvOverrides, StyleConfig};
pub use crate::layout::canvas::{CanvasSize, canvas_dimensions};
pub use crate::layout::plan::LayoutPlan;
pub use crate::layout::sizing::{
    band_height, min_dimension, subtitle_font_size, watermark_font_size,
};
pub use crate::render::compositor::draw_layered_subtitles;
pub use crate::render::cpu::CpuSurface;
pub use crate::render::frame::{FrameRGBA, encode_frame};
pub use crate::render::pipeline::{RenderReport, render, render_into};
pub use crate::render::record::{DrawCommand, RecordingSurface};
pub use crate::render::surface::{OpacityScope, RasterSurface, TextAlign, TextBaseline, TextStyle};
pub use crate::render::watermark::{WatermarkPlacement, draw_watermark};
pub use crate::scene::model::{
    SubtitleSpec, SubtitleStyle, WatermarkSpec, WatermarkStyle, split_subtitle_lines,
};
pub use crate::session::{ImageInfo, Session, format_file_size};
