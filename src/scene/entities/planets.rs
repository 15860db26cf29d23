use crate::assets::library::{MOON_URL, SceneAssets};
use crate::foundation::core::Rgba8;
use crate::render::surface::{DrawSurface, Paint, circle_path};
use crate::scene::entity::Entity;

pub const SUN_COLOR: Rgba8 = Rgba8::rgb(0xFF, 0xCC, 0x33);

pub(crate) fn draw_sun(entity: &Entity, surface: &mut dyn DrawSurface) {
    let path = circle_path(entity.position().to_rect());
    surface.fill_path(&path, &Paint::Solid(SUN_COLOR));
}

/// The moon fades in through the entity's transition; without one it is fully opaque.
pub(crate) fn draw_moon(assets: &SceneAssets, entity: &Entity, surface: &mut dyn DrawSurface) {
    let Some(image) = assets.moon.get(MOON_URL) else {
        return;
    };
    surface.save();
    surface.set_global_alpha(entity.transition_value_or(1.0));
    surface.draw_image(image, entity.position().to_rect());
    surface.restore();
}
