use super::*;
use crate::render::surface::{OpacityScope, TextAlign, TextBaseline};

fn style() -> TextStyle {
    TextStyle {
        size_px: 10.0,
        bold: false,
        align: TextAlign::Left,
        baseline: TextBaseline::Top,
    }
}

#[test]
fn reset_clears_previous_commands() {
    let mut s = RecordingSurface::new();
    s.reset(4, 4).unwrap();
    s.fill_text("x", Point::ORIGIN, &style(), Rgba8::WHITE)
        .unwrap();
    s.reset(8, 2).unwrap();
    assert_eq!(s.commands(), &[DrawCommand::Reset {
        width: 8,
        height: 2
    }]);
    assert_eq!(s.size(), Some((8, 2)));
}

#[test]
fn opacity_scope_restores_alpha_on_drop() {
    let mut s = RecordingSurface::new();
    s.reset(4, 4).unwrap();
    {
        let mut scoped = OpacityScope::new(&mut s, 0.25);
        assert_eq!(scoped.global_alpha(), 0.25);
        scoped
            .fill_text("a", Point::ORIGIN, &style(), Rgba8::WHITE)
            .unwrap();
    }
    assert_eq!(s.global_alpha(), 1.0);
    s.fill_text("b", Point::ORIGIN, &style(), Rgba8::WHITE)
        .unwrap();

    let alphas: Vec<f32> = s
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillText { alpha, .. } => Some(*alpha),
            _ => None,
        })
        .collect();
    assert_eq!(alphas, vec![0.25, 1.0]);
}

#[test]
fn opacity_scope_restores_alpha_on_early_error() {
    fn failing(s: &mut RecordingSurface) -> CaptionResult<()> {
        let _scope = OpacityScope::new(s, 0.5);
        Err(CaptionError::render("boom"))
    }

    let mut s = RecordingSurface::new();
    assert!(failing(&mut s).is_err());
    assert_eq!(s.global_alpha(), 1.0);
}

#[test]
fn opacity_scope_clamps_alpha() {
    let mut s = RecordingSurface::new();
    let scoped = OpacityScope::new(&mut s, 3.0);
    assert_eq!(scoped.global_alpha(), 1.0);
}

#[test]
fn nested_scopes_restore_outer_alpha() {
    let mut s = RecordingSurface::new();
    {
        let mut outer = OpacityScope::new(&mut s, 0.5);
        {
            let inner = OpacityScope::new(&mut *outer, 0.2);
            assert_eq!(inner.global_alpha(), 0.2);
        }
        assert_eq!(outer.global_alpha(), 0.5);
    }
    assert_eq!(s.global_alpha(), 1.0);
}

#[test]
fn reset_restores_full_alpha() {
    let mut s = RecordingSurface::new();
    s.set_global_alpha(0.4);
    s.reset(2, 2).unwrap();
    assert_eq!(s.global_alpha(), 1.0);
}

#[test]
fn commands_serialize_with_op_tag() {
    let mut s = RecordingSurface::new();
    s.reset(2, 3).unwrap();
    let v = serde_json::to_value(s.commands()).unwrap();
    assert_eq!(v[0]["op"], "reset");
    assert_eq!(v[0]["height"], 3);
}
