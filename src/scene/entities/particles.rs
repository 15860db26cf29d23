use std::cell::Cell;
use std::rc::Rc;

use crate::assets::library::{CLOUD_URLS, SNOWFLAKE_URL, SceneAssets};
use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::math::{Rng64, degrees_to_radians};
use crate::render::glow::{default_glow, with_glow};
use crate::render::surface::{DrawSurface, Paint, circle_path};
use crate::scene::entities::thunderstorm;
use crate::scene::entity::{Entity, EntityParams, EntityRef};
use crate::scene::kind::{EntityKind, ParticleKind};

pub const RAIN_COLOR: Rgba8 = Rgba8::rgb(0x67, 0x9e, 0xbf);
pub const RAIN_WIDTH: f64 = 3.0;
pub const STAR_COLOR: Rgba8 = Rgba8::rgb(255, 255, 255);

/// A cloud drawn from one randomly chosen cloud asset.
#[derive(Debug)]
pub struct CloudParticle {
    assets: Rc<SceneAssets>,
    asset_key: String,
    sized: Cell<bool>,
}

impl CloudParticle {
    pub fn asset_key(&self) -> &str {
        &self.asset_key
    }
}

/// Picks the cloud asset up front; the particle takes that asset's size, or 1x1 while
/// the clouds are still loading.
pub fn new_cloud(mut params: EntityParams, assets: Rc<SceneAssets>, rng: &Rng64) -> Entity {
    let asset_key = rng.pick(&CLOUD_URLS).copied().unwrap_or(CLOUD_URLS[0]).to_string();
    let size = assets.clouds.get(&asset_key).map(|a| a.size());
    let (width, height) = size.unwrap_or((1.0, 1.0));
    params.position.width = width;
    params.position.height = height;

    let cloud = CloudParticle {
        assets,
        asset_key,
        sized: Cell::new(size.is_some()),
    };
    Entity::new(params, EntityKind::Particle(ParticleKind::Cloud(Rc::new(cloud))))
}

/// Clouds spawned before their asset loaded grow to the asset's size once it arrives.
pub(crate) fn adopt_cloud_size(cloud: &CloudParticle, this: &EntityRef) {
    if cloud.sized.get() {
        return;
    }
    let Some((width, height)) = cloud.assets.clouds.get(&cloud.asset_key).map(|a| a.size()) else {
        return;
    };
    let mut entity = this.borrow_mut();
    entity.set_width(width);
    entity.set_height(height);
    cloud.sized.set(true);
}

pub(crate) fn draw(kind: &ParticleKind, entity: &Entity, surface: &mut dyn DrawSurface) {
    let position = entity.position();
    match kind {
        ParticleKind::Cloud(cloud) => {
            let Some(image) = cloud.assets.clouds.get(&cloud.asset_key) else {
                return;
            };
            with_glow(surface, default_glow(), |s| {
                s.draw_image(image, position.to_rect());
            });
        }
        ParticleKind::Rain => {
            let rect = Rect::new(
                position.x,
                position.y,
                position.x + RAIN_WIDTH,
                position.bottom(),
            );
            surface.fill_rect(rect, &Paint::Solid(RAIN_COLOR));
        }
        ParticleKind::Snowflake(assets) => {
            let Some(image) = assets.snowflake.get(SNOWFLAKE_URL) else {
                return;
            };
            let (hw, hh) = (position.width / 2.0, position.height / 2.0);
            surface.save();
            surface.translate(position.center().to_vec2());
            surface.rotate(degrees_to_radians(position.rotation));
            surface.draw_image(image, Rect::new(-hw, -hh, hw, hh));
            surface.restore();
        }
        ParticleKind::Star => {
            let color = STAR_COLOR.with_opacity(entity.transition_value_or(1.0));
            surface.fill_path(&circle_path(position.to_rect()), &Paint::Solid(color));
        }
        ParticleKind::Lightning(bolt) => thunderstorm::draw_bolt(bolt, entity, surface),
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/entities/particles.rs"]
mod tests;
