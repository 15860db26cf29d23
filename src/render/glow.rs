use crate::foundation::core::{Rgba8, Vec2};
use crate::render::surface::{DrawSurface, Shadow};

pub const DEFAULT_GLOW_BLUR: f64 = 10.0;

/// rgba(0, 0, 0, 0.5) with a 10 px blur and no offset.
pub fn default_glow() -> Shadow {
    Shadow {
        color: Rgba8::rgb(0, 0, 0).with_opacity(0.5),
        blur: DEFAULT_GLOW_BLUR,
        offset: Vec2::ZERO,
    }
}

/// Runs `draw` with `glow` as the active shadow, then clears the shadow again.
pub fn with_glow<R>(
    surface: &mut dyn DrawSurface,
    glow: Shadow,
    draw: impl FnOnce(&mut dyn DrawSurface) -> R,
) -> R {
    surface.set_shadow(Some(glow));
    let out = draw(&mut *surface);
    surface.set_shadow(None);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/glow.rs"]
mod tests;
