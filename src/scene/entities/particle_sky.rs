use std::cell::OnceCell;
use std::rc::Rc;

use crate::foundation::core::BoundingBox;
use crate::foundation::error::WeatherscapeResult;
use crate::render::surface::RenderContext;
use crate::scene::entities::particles;
use crate::scene::entity::{Category, Entity, EntityParams, EntityRef};
use crate::scene::env::SceneEnv;
use crate::scene::kind::{EntityKind, ParticleKind};
use crate::scene::particle_factory::{
    BoxSide, CreateOptions, EdgeEntry, ParticleConstructor, ParticleFactory, ParticleOptions,
    Range, VelocityRange,
};

/// Particle skies that differ only in their particle configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkyPreset {
    Clouds,
    Rain,
    Snow,
}

impl SkyPreset {
    pub fn name(self) -> &'static str {
        match self {
            Self::Clouds => "cloud-sky",
            Self::Rain => "rain-sky",
            Self::Snow => "snow-sky",
        }
    }

    pub fn particle_count(self) -> usize {
        match self {
            Self::Clouds => 30,
            Self::Rain => 100,
            Self::Snow => 25,
        }
    }

    pub fn particle_options(self, env: &SceneEnv) -> ParticleOptions {
        match self {
            Self::Clouds => {
                let assets = env.assets.clone();
                let rng = env.rng.clone();
                let constructor: ParticleConstructor =
                    Rc::new(move |params| particles::new_cloud(params, assets.clone(), &rng));
                let drift = Range::new(-0.5, -1.0);
                let mut options =
                    ParticleOptions::new(Category::Particle, constructor, Range::new(100.0, 200.0));
                options.velocity = VelocityRange {
                    x: drift,
                    ..VelocityRange::default()
                };
                options.edges = vec![EdgeEntry {
                    side: BoxSide::Right,
                    x: drift,
                    y: Range::ZERO,
                }];
                options
            }
            Self::Rain => {
                let constructor: ParticleConstructor = Rc::new(|params| {
                    Entity::new(params, EntityKind::Particle(ParticleKind::Rain))
                });
                let fall = Range::new(15.0, 20.0);
                let mut options =
                    ParticleOptions::new(Category::Particle, constructor, Range::new(30.0, 50.0));
                options.velocity = VelocityRange {
                    y: fall,
                    ..VelocityRange::default()
                };
                options.edges = vec![EdgeEntry {
                    side: BoxSide::Top,
                    x: Range::ZERO,
                    y: fall,
                }];
                options
            }
            Self::Snow => {
                let assets = env.assets.clone();
                let constructor: ParticleConstructor = Rc::new(move |params| {
                    Entity::new(
                        params,
                        EntityKind::Particle(ParticleKind::Snowflake(assets.clone())),
                    )
                });
                let (drift, fall) = (Range::new(-0.1, -0.5), Range::new(0.1, 0.5));
                let mut options =
                    ParticleOptions::new(Category::Particle, constructor, Range::new(20.0, 40.0));
                options.velocity = VelocityRange {
                    x: drift,
                    y: fall,
                    rotation: Range::new(-0.8, 0.8),
                };
                options.edges = [BoxSide::Top, BoxSide::Right]
                    .into_iter()
                    .map(|side| EdgeEntry {
                        side,
                        x: drift,
                        y: fall,
                    })
                    .collect();
                options
            }
        }
    }
}

#[derive(Debug)]
pub struct ParticleSkyState {
    preset: SkyPreset,
    factory: OnceCell<Rc<ParticleFactory>>,
}

impl ParticleSkyState {
    pub fn preset(&self) -> SkyPreset {
        self.preset
    }

    pub fn factory(&self) -> Option<&Rc<ParticleFactory>> {
        self.factory.get()
    }
}

/// Builds a sky filled with `preset` particles that replace themselves on exit.
pub fn create_particle_sky(
    preset: SkyPreset,
    env: &Rc<SceneEnv>,
    context: RenderContext,
    position: BoundingBox,
    viewport: BoundingBox,
) -> WeatherscapeResult<EntityRef> {
    let state = Rc::new(ParticleSkyState {
        preset,
        factory: OnceCell::new(),
    });
    let sky = EntityRef::new(Entity::new(
        EntityParams::new(context, position).viewport(viewport),
        EntityKind::ParticleSky(state.clone()),
    ));

    let factory = ParticleFactory::new_self_replacing(
        sky.downgrade(),
        preset.particle_options(env),
        env.rng.clone(),
    )?;
    let _ = state.factory.set(factory.clone());
    factory.create(CreateOptions::center(preset.particle_count()))?;
    tracing::debug!(sky = preset.name(), "particle sky created");
    Ok(sky)
}

/// Particles cull against the sky's own box.
pub(crate) fn on_resize(this: &EntityRef) {
    let bounds = this.position();
    for particle in this.all_children() {
        particle.borrow_mut().set_viewport(bounds);
    }
}
