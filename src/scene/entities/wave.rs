use crate::foundation::core::{BezPath, Point, Rgba8};
use crate::render::surface::{DrawSurface, LinearGradient, Paint};
use crate::scene::entity::{Entity, EntityRef};

pub const WAVE_COLOR_TOP: Rgba8 = Rgba8::rgb(0x67, 0x9e, 0xbf);
pub const WAVE_COLOR_BOTTOM: Rgba8 = Rgba8::rgb(0xFF, 0xFF, 0xFF);
/// Half a period; one crest plus one trough spans twice this.
pub const WAVE_WIDTH: f64 = 300.0;
pub const WAVE_HEIGHT: f64 = 30.0;

/// Width of the wave entity: one full period.
pub fn period() -> f64 {
    WAVE_WIDTH * 2.0
}

/// Snaps the offset back once a full period has scrolled past.
pub(crate) fn wrap(this: &EntityRef) {
    let mut entity = this.borrow_mut();
    let position = entity.position_mut();
    if position.x.abs() >= period() - 1.0 {
        position.x = 0.0;
    }
}

pub(crate) fn wave_path(offset_x: f64, frame_width: f64, frame_height: f64) -> BezPath {
    let mid = frame_height / 2.0;
    let low = mid + WAVE_HEIGHT;
    let iterations = (frame_width / period()).ceil() as i64 + 2;

    let mut path = BezPath::new();
    path.move_to(Point::new(0.0, mid));
    for i in -1..iterations {
        let start = period() * i as f64 + offset_x;
        path.curve_to(
            Point::new(start + WAVE_WIDTH / 2.0, mid),
            Point::new(start + WAVE_WIDTH / 2.0, low),
            Point::new(start + WAVE_WIDTH, low),
        );
        path.curve_to(
            Point::new(start + WAVE_WIDTH * 1.5, low),
            Point::new(start + WAVE_WIDTH * 1.5, mid),
            Point::new(start + period(), mid),
        );
    }
    path.line_to(Point::new(frame_width, frame_height));
    path.line_to(Point::new(0.0, frame_height));
    path.close_path();
    path
}

pub(crate) fn draw(entity: &Entity, surface: &mut dyn DrawSurface) {
    let (fw, fh) = entity.frame_size();
    let paint = Paint::LinearGradient(LinearGradient {
        start: Point::new(0.0, fh / 2.0),
        end: Point::new(0.0, fh),
        from: WAVE_COLOR_TOP,
        to: WAVE_COLOR_BOTTOM,
    });
    surface.fill_path(&wave_path(entity.position().x, fw, fh), &paint);
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/entities/wave.rs"]
mod tests;
