use super::*;
use crate::foundation::core::Rect;
use crate::render::recording::{DrawCommand, RecordingSurface};
use crate::render::surface::Paint;

#[test]
fn glow_applies_only_inside_the_wrapper() {
    let mut s = RecordingSurface::new(10, 10);
    let paint = Paint::Solid(Rgba8::rgb(1, 1, 1));
    let returned = with_glow(&mut s, default_glow(), |surface| {
        surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &paint);
        7
    });
    s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &paint);

    assert_eq!(returned, 7);
    let cmds = s.commands();
    let DrawCommand::FillRect { state, .. } = &cmds[0] else {
        panic!("expected fill");
    };
    let shadow = state.shadow.unwrap();
    assert_eq!(shadow.blur, 10.0);
    assert_eq!(shadow.color, Rgba8::rgba(0, 0, 0, 128));
    assert_eq!(shadow.offset, Vec2::ZERO);
    assert!(cmds[1].state().unwrap().shadow.is_none());
}
