use super::*;
use crate::{
    foundation::core::Point,
    render::record::{DrawCommand, RecordingSurface},
    scene::model::{SubtitleStyle, WatermarkStyle},
};

fn image(width: u32, height: u32) -> SourceImage {
    SourceImage::from_rgba8(width, height, vec![128; (width * height * 4) as usize]).unwrap()
}

fn subtitle(text: &str) -> SubtitleSpec {
    SubtitleSpec::from_text(text, SubtitleStyle::default())
}

fn watermark(text: &str) -> WatermarkSpec {
    WatermarkSpec::new(text, WatermarkStyle::default())
}

#[test]
fn missing_image_is_reported() {
    let mut s = RecordingSurface::new();
    let err = render_into(&mut s, None, &subtitle("a"), &watermark("")).unwrap_err();
    assert!(matches!(err, CaptionError::NoImageLoaded));
    assert!(s.commands().is_empty());
}

#[test]
fn invalid_style_leaves_surface_untouched() {
    let img = image(100, 100);
    let mut s = RecordingSurface::new();
    render_into(&mut s, Some(&img), &subtitle("ok"), &watermark("")).unwrap();
    let before = s.commands().to_vec();

    let bad = SubtitleSpec::from_text(
        "x",
        SubtitleStyle {
            stroke_width: -2.0,
            ..SubtitleStyle::default()
        },
    );
    let err = render_into(&mut s, Some(&img), &bad, &watermark("")).unwrap_err();
    assert!(matches!(err, CaptionError::InvalidStyleParameter(_)));
    assert_eq!(s.commands(), before.as_slice());
}

#[test]
fn two_lines_on_1000x800() {
    let img = image(1000, 800);
    let mut s = RecordingSurface::new();
    let report = render_into(&mut s, Some(&img), &subtitle("Line A\nLine B"), &watermark("")).unwrap();

    assert_eq!(report.plan.font_size, 48);
    assert_eq!(report.plan.band_height, 120.0);
    assert_eq!(s.size(), Some((1000, 920)));
    assert_eq!(report.watermark, None);

    match &s.commands()[..2] {
        [
            DrawCommand::Reset {
                width: 1000,
                height: 920,
            },
            DrawCommand::Blit { src, dst, .. },
        ] => {
            assert_eq!(*src, Rect::new(0.0, 0.0, 1000.0, 800.0));
            assert_eq!(*dst, Rect::new(0.0, 0.0, 1000.0, 800.0));
        }
        other => panic!("unexpected prefix: {other:?}"),
    }

    let band_tops: Vec<f64> = s.commands()[2..]
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Blit { dst, .. } => Some(dst.y0),
            _ => None,
        })
        .collect();
    assert_eq!(band_tops, vec![680.0, 800.0]);
}

#[test]
fn watermark_only_on_500x500() {
    let img = image(500, 500);
    let mut s = RecordingSurface::new();
    let report = render_into(&mut s, Some(&img), &subtitle(""), &watermark("Sample")).unwrap();

    assert_eq!(s.size(), Some((500, 500)));
    let placed = report.watermark.unwrap();
    assert_eq!(placed.font_size, 30);
    assert!((placed.anchor.x - 482.0).abs() < 1e-9);
    assert!((placed.anchor.y - 18.0).abs() < 1e-9);

    // reset, base image, watermark stroke, watermark fill
    assert_eq!(s.commands().len(), 4);
}

#[test]
fn blank_lines_behave_like_empty_text() {
    let img = image(640, 480);
    let mut a = RecordingSurface::new();
    let mut b = RecordingSurface::new();
    let ra = render_into(&mut a, Some(&img), &subtitle("\n\n"), &watermark("wm")).unwrap();
    let rb = render_into(&mut b, Some(&img), &subtitle(""), &watermark("wm")).unwrap();
    assert_eq!(ra, rb);
    assert_eq!(a.commands(), b.commands());
}

#[test]
fn render_is_idempotent() {
    let img = image(777, 555);
    let sub = subtitle("one\ntwo\nthree");
    let wm = watermark("mark");
    let mut a = RecordingSurface::new();
    let mut b = RecordingSurface::new();
    render_into(&mut a, Some(&img), &sub, &wm).unwrap();
    render_into(&mut b, Some(&img), &sub, &wm).unwrap();
    assert_eq!(a.commands(), b.commands());

    render_into(&mut a, Some(&img), &sub, &wm).unwrap();
    assert_eq!(a.commands(), b.commands());
}

#[test]
fn watermark_alpha_does_not_leak_into_next_render() {
    let img = image(500, 500);
    let wm = WatermarkSpec::new(
        "mark",
        WatermarkStyle {
            opacity: 0.25,
            ..WatermarkStyle::default()
        },
    );
    let mut s = RecordingSurface::new();
    render_into(&mut s, Some(&img), &subtitle(""), &wm).unwrap();
    assert_eq!(s.global_alpha(), 1.0);

    render_into(&mut s, Some(&img), &subtitle("after"), &watermark("")).unwrap();
    for c in s.commands() {
        match c {
            DrawCommand::Blit { alpha, .. }
            | DrawCommand::StrokeText { alpha, .. }
            | DrawCommand::FillText { alpha, .. }
            | DrawCommand::StrokeLine { alpha, .. } => assert_eq!(*alpha, 1.0),
            DrawCommand::Reset { .. } => {}
        }
    }
}

#[test]
fn watermark_stays_in_original_image_region() {
    let img = image(800, 600);
    let mut s = RecordingSurface::new();
    render_into(&mut s, Some(&img), &subtitle("a\nb\nc\nd"), &watermark("wm")).unwrap();
    let anchors: Vec<Point> = s
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillText { text, anchor, .. } if text == "wm" => Some(*anchor),
            _ => None,
        })
        .collect();
    assert_eq!(anchors.len(), 1);
    assert!(anchors[0].y < 600.0);
    assert!(anchors[0].x < 800.0);
}
