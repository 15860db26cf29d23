use std::rc::Rc;

use crate::assets::library::SceneAssets;
use crate::render::surface::DrawSurface;
use crate::scene::entities::circadian::{self, CircadianState};
use crate::scene::entities::particle_sky::{self, ParticleSkyState};
use crate::scene::entities::particles::{self, CloudParticle};
use crate::scene::entities::sky::{self, SkyState};
use crate::scene::entities::thunderstorm::{self, LightningBolt, ThunderstormState};
use crate::scene::entities::{background, planets, root, wave};
use crate::scene::entity::{Entity, EntityRef};

/// Per-variant behaviour of an entity.
///
/// Cloning is cheap; stateful variants share their state through `Rc`.
#[derive(Clone)]
pub enum EntityKind {
    /// Container without drawing of its own.
    Group,
    Root,
    Background,
    Sky(Rc<SkyState>),
    CircadianCycle(Rc<CircadianState>),
    Planet(Planet),
    Wave,
    ParticleSky(Rc<ParticleSkyState>),
    ThunderstormSky(Rc<ThunderstormState>),
    Particle(ParticleKind),
}

#[derive(Clone)]
pub enum Planet {
    Sun,
    Moon(Rc<SceneAssets>),
}

#[derive(Clone)]
pub enum ParticleKind {
    Cloud(Rc<CloudParticle>),
    Rain,
    Snowflake(Rc<SceneAssets>),
    Star,
    Lightning(Rc<LightningBolt>),
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Root => "root",
            Self::Background => "background",
            Self::Sky(_) => "sky",
            Self::CircadianCycle(_) => "circadian-cycle",
            Self::Planet(Planet::Sun) => "sun",
            Self::Planet(Planet::Moon(_)) => "moon",
            Self::Wave => "wave",
            Self::ParticleSky(state) => state.preset().name(),
            Self::ThunderstormSky(_) => "thunderstorm-sky",
            Self::Particle(ParticleKind::Cloud(_)) => "cloud-particle",
            Self::Particle(ParticleKind::Rain) => "rain-particle",
            Self::Particle(ParticleKind::Snowflake(_)) => "snowflake-particle",
            Self::Particle(ParticleKind::Star) => "star-particle",
            Self::Particle(ParticleKind::Lightning(_)) => "lightning-particle",
        }
    }

    pub(crate) fn draw(&self, entity: &Entity, surface: &mut dyn DrawSurface) {
        match self {
            Self::Group
            | Self::Root
            | Self::Sky(_)
            | Self::ParticleSky(_)
            | Self::ThunderstormSky(_) => {}
            Self::Background => background::draw(entity, surface),
            Self::CircadianCycle(state) => circadian::draw(state, entity, surface),
            Self::Planet(Planet::Sun) => planets::draw_sun(entity, surface),
            Self::Planet(Planet::Moon(assets)) => planets::draw_moon(assets, entity, surface),
            Self::Wave => wave::draw(entity, surface),
            Self::Particle(kind) => particles::draw(kind, entity, surface),
        }
    }

    /// Runs after visibility has been recomputed and before the children update.
    pub(crate) fn after_update(&self, this: &EntityRef) {
        match self {
            Self::Sky(state) => sky::refresh_weather_sky(state, this),
            Self::CircadianCycle(state) => circadian::refresh(state, this),
            Self::Wave => wave::wrap(this),
            Self::Particle(ParticleKind::Cloud(cloud)) => particles::adopt_cloud_size(cloud, this),
            Self::Particle(ParticleKind::Lightning(bolt)) => thunderstorm::grow(bolt, this),
            _ => {}
        }
    }

    pub(crate) fn on_resize(&self, this: &EntityRef) {
        match self {
            Self::Root => root::layout(this),
            Self::Sky(_) => sky::forward_resize(this),
            Self::CircadianCycle(state) => circadian::on_resize(state, this),
            Self::ParticleSky(_) => particle_sky::on_resize(this),
            Self::ThunderstormSky(_) => thunderstorm::on_resize(this),
            _ => {}
        }
    }

    pub(crate) fn on_destroy(&self) {
        if let Self::Sky(state) = self {
            sky::unsubscribe(state);
        }
    }
}

impl std::fmt::Debug for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
