use crate::foundation::core::Rgba8;
use crate::render::surface::{DrawSurface, Paint};
use crate::scene::entity::Entity;

pub const BACKGROUND_COLOR: Rgba8 = Rgba8::rgb(255, 255, 255);

pub(crate) fn draw(entity: &Entity, surface: &mut dyn DrawSurface) {
    surface.fill_rect(entity.position().to_rect(), &Paint::Solid(BACKGROUND_COLOR));
}
