use super::*;
use crate::{
    foundation::core::Rect,
    render::record::{DrawCommand, RecordingSurface},
};

fn image(width: u32, height: u32) -> SourceImage {
    SourceImage::from_rgba8(width, height, vec![255; (width * height * 4) as usize]).unwrap()
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn run(img: &SourceImage, items: &[&str], style: &SubtitleStyle) -> Vec<DrawCommand> {
    let lines = lines(items);
    let plan = LayoutPlan::compute(img.width(), img.height(), lines.len()).unwrap();
    let mut surface = RecordingSurface::new();
    draw_layered_subtitles(&mut surface, img, &plan, &lines, style).unwrap();
    surface.into_commands()
}

#[test]
fn empty_lines_draw_nothing() {
    assert!(run(&image(10, 10), &[], &SubtitleStyle::default()).is_empty());
}

#[test]
fn two_lines_on_1000x800() {
    let img = image(1000, 800);
    let cmds = run(&img, &["Line A", "Line B"], &SubtitleStyle::default());

    let blits: Vec<(Rect, Rect)> = cmds
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Blit { src, dst, .. } => Some((*src, *dst)),
            _ => None,
        })
        .collect();
    assert_eq!(
        blits,
        vec![
            (
                Rect::new(0.0, 680.0, 1000.0, 800.0),
                Rect::new(0.0, 680.0, 1000.0, 800.0)
            ),
            (
                Rect::new(0.0, 680.0, 1000.0, 800.0),
                Rect::new(0.0, 800.0, 1000.0, 920.0)
            ),
        ]
    );

    let fills: Vec<(String, Point)> = cmds
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillText { text, anchor, .. } => Some((text.clone(), *anchor)),
            _ => None,
        })
        .collect();
    assert_eq!(
        fills,
        vec![
            ("Line A".to_string(), Point::new(500.0, 740.0)),
            ("Line B".to_string(), Point::new(500.0, 860.0)),
        ]
    );
}

#[test]
fn separator_only_above_later_bands() {
    let img = image(1000, 800);
    let cmds = run(&img, &["a", "b", "c"], &SubtitleStyle::default());
    let lines: Vec<(Point, Point, Rgba8, f64)> = cmds
        .iter()
        .filter_map(|c| match c {
            DrawCommand::StrokeLine {
                from,
                to,
                color,
                width,
                ..
            } => Some((*from, *to, *color, *width)),
            _ => None,
        })
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].0, Point::new(0.0, 800.0));
    assert_eq!(lines[0].1, Point::new(1000.0, 800.0));
    assert_eq!(lines[1].0.y, 920.0);
    assert_eq!(lines[0].2, Rgba8::rgba(255, 255, 255, 204));
    assert_eq!(lines[0].3, 2.0);
}

#[test]
fn stroke_precedes_fill_for_each_line() {
    let img = image(400, 400);
    let style = SubtitleStyle {
        color: Rgba8::rgb(255, 255, 0),
        stroke_color: Rgba8::rgb(0, 0, 255),
        stroke_width: 3.0,
    };
    let cmds = run(&img, &["one", "two"], &style);
    let text_ops: Vec<&str> = cmds
        .iter()
        .filter_map(|c| match c {
            DrawCommand::StrokeText { .. } => Some("stroke"),
            DrawCommand::FillText { .. } => Some("fill"),
            _ => None,
        })
        .collect();
    assert_eq!(text_ops, vec!["stroke", "fill", "stroke", "fill"]);

    match &cmds.iter().find(|c| matches!(c, DrawCommand::StrokeText { .. })) {
        Some(DrawCommand::StrokeText {
            color,
            width,
            style,
            ..
        }) => {
            assert_eq!(*color, Rgba8::rgb(0, 0, 255));
            assert_eq!(*width, 3.0);
            assert!(style.bold);
            assert_eq!(style.size_px, 32.0);
            assert_eq!(style.align, TextAlign::Center);
            assert_eq!(style.baseline, TextBaseline::Middle);
        }
        other => panic!("expected stroke text, got {other:?}"),
    }
}

#[test]
fn zero_stroke_width_skips_outline() {
    let img = image(400, 400);
    let style = SubtitleStyle {
        stroke_width: 0.0,
        ..SubtitleStyle::default()
    };
    let cmds = run(&img, &["only fill"], &style);
    assert!(
        !cmds
            .iter()
            .any(|c| matches!(c, DrawCommand::StrokeText { .. }))
    );
    assert_eq!(
        cmds.iter()
            .filter(|c| matches!(c, DrawCommand::FillText { .. }))
            .count(),
        1
    );
}

#[test]
fn every_band_reuses_the_same_crop() {
    let img = image(640, 360);
    let cmds = run(&img, &["1", "2", "3", "4"], &SubtitleStyle::default());
    let srcs: Vec<Rect> = cmds
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Blit { src, .. } => Some(*src),
            _ => None,
        })
        .collect();
    assert_eq!(srcs.len(), 4);
    assert!(srcs.iter().all(|s| *s == srcs[0]));
}
