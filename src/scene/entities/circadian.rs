use std::cell::Cell;
use std::f64::consts::PI;
use std::rc::Rc;

use crate::animation::transition::{Transition, TransitionParams};
use crate::foundation::core::{BoundingBox, Rgba8};
use crate::render::surface::{DrawSurface, Paint, RenderContext};
use crate::scene::entity::{Category, Entity, EntityParams, EntityRef};
use crate::scene::env::SceneEnv;
use crate::scene::kind::{EntityKind, ParticleKind, Planet};
use crate::scene::particle_factory::{
    CreateOptions, ParticleConstructor, ParticleFactory, ParticleOptions, Range,
};

pub const PLANET_SIZE: f64 = 100.0;
pub const PLANET_PADDING: f64 = 50.0;
pub const STAR_SIZE: Range = Range { min: 1.0, max: 3.0 };
const SECONDS_PER_DAY: i64 = 86_400;
const OVERLAY_COLOR: Rgba8 = Rgba8::rgb(0, 0, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircadianPhase {
    Day,
    Night,
}

/// Phase at `now` and how far through that phase we are, in `[0, 1]`.
///
/// Sunrise and sunset are first moved by whole days so that the sunrise falls within
/// the day before `now`; a snapshot from an earlier day still describes today. Night
/// spans from sunset to the following sunrise, one day after the moved sunrise.
pub fn classify(now: i64, sunrise: i64, sunset: i64) -> (CircadianPhase, f64) {
    if sunset <= sunrise {
        return (CircadianPhase::Day, 0.5);
    }
    let shift = (now - sunrise).div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY;
    let (sunrise, sunset) = (sunrise + shift, sunset + shift);
    if now < sunset {
        return (CircadianPhase::Day, fraction(now - sunrise, sunset - sunrise));
    }
    let next_sunrise = sunrise + SECONDS_PER_DAY;
    (CircadianPhase::Night, fraction(now - sunset, next_sunrise - sunset))
}

fn fraction(elapsed: i64, duration: i64) -> f64 {
    if duration <= 0 {
        return 0.5;
    }
    (elapsed as f64 / duration as f64).clamp(0.0, 1.0)
}

/// Top of the planet for a phase `fraction`: highest at mid-phase, one box height
/// lower at either end.
pub fn planet_y(bounds: &BoundingBox, fraction: f64) -> f64 {
    bounds.y + PLANET_PADDING + (1.0 - (PI * fraction).sin()) * bounds.height
}

pub struct CircadianState {
    env: Rc<SceneEnv>,
    phase: Cell<Option<CircadianPhase>>,
    fraction: Cell<f64>,
    overlay_alpha: Cell<f64>,
}

impl CircadianState {
    pub fn phase(&self) -> Option<CircadianPhase> {
        self.phase.get()
    }
}

impl std::fmt::Debug for CircadianState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircadianState")
            .field("phase", &self.phase.get())
            .field("fraction", &self.fraction.get())
            .field("overlay_alpha", &self.overlay_alpha.get())
            .finish_non_exhaustive()
    }
}

pub fn create_circadian(
    env: &Rc<SceneEnv>,
    context: RenderContext,
    position: BoundingBox,
    viewport: BoundingBox,
) -> EntityRef {
    let state = Rc::new(CircadianState {
        env: env.clone(),
        phase: Cell::new(None),
        fraction: Cell::new(0.5),
        overlay_alpha: Cell::new(0.0),
    });
    let cycle = EntityRef::new(Entity::new(
        EntityParams::new(context, position).viewport(viewport),
        EntityKind::CircadianCycle(state.clone()),
    ));
    refresh(&state, &cycle);
    cycle
}

/// Re-reads the clock and the weather, swapping planet, overlay and stars on a phase
/// change. Without weather data the cycle stays at midday.
pub(crate) fn refresh(state: &CircadianState, this: &EntityRef) {
    let now = state.env.host.clock.now_epoch_secs();
    let (phase, fraction) = match state.env.weather.weather() {
        Some(w) => classify(now, w.sunrise_epoch_seconds, w.sunset_epoch_seconds),
        None => (CircadianPhase::Day, 0.5),
    };
    state.fraction.set(fraction);

    let previous = state.phase.replace(Some(phase));
    if previous != Some(phase) {
        tracing::debug!(?previous, ?phase, "circadian phase changed");
        swap_planet(state, this, phase);
        fade_overlay(state, this, phase, previous.is_none());
        reset_stars(state, this, phase);
    }
    place_planet(this, fraction);
}

fn swap_planet(state: &CircadianState, this: &EntityRef, phase: CircadianPhase) {
    for old in this.children(Category::Planet) {
        this.remove_child(Category::Planet, &old);
        old.destroy();
    }

    let viewport = this.viewport();
    let bounds = BoundingBox::new(
        viewport.x + viewport.width / 2.0 - PLANET_SIZE / 2.0,
        planet_y(&this.position(), state.fraction.get()),
        PLANET_SIZE,
        PLANET_SIZE,
    );
    let params = EntityParams::new(this.context(), bounds).viewport(viewport);
    let planet = match phase {
        CircadianPhase::Day => EntityRef::new(Entity::new(params, EntityKind::Planet(Planet::Sun))),
        CircadianPhase::Night => {
            let moon = EntityRef::new(Entity::new(
                params,
                EntityKind::Planet(Planet::Moon(state.env.assets.clone())),
            ));
            moon.set_transition(fade_in(state));
            moon
        }
    };
    this.add_child(Category::Planet, planet);
}

fn fade_in(state: &CircadianState) -> Transition {
    Transition::new(
        TransitionParams::linear(0.0, 1.0, state.env.config.planet_fade_ms),
        &state.env.host,
    )
}

/// Cross-fades the night overlay. The first phase is applied without a fade.
fn fade_overlay(state: &CircadianState, this: &EntityRef, phase: CircadianPhase, initial: bool) {
    let target = match phase {
        CircadianPhase::Day => 0.0,
        CircadianPhase::Night => state.env.config.night_overlay_alpha,
    };
    let current = this.borrow().transition_value_or(state.overlay_alpha.get());
    state.overlay_alpha.set(target);
    if initial {
        this.clear_transition();
        return;
    }
    this.set_transition(Transition::new(
        TransitionParams::linear(current, target, state.env.config.overlay_fade_ms),
        &state.env.host,
    ));
}

fn reset_stars(state: &CircadianState, this: &EntityRef, phase: CircadianPhase) {
    for star in this.children(Category::Star) {
        this.remove_child(Category::Star, &star);
        star.destroy();
    }
    if phase != CircadianPhase::Night || state.env.config.star_count == 0 {
        return;
    }

    let constructor: ParticleConstructor =
        Rc::new(|params| Entity::new(params, EntityKind::Particle(ParticleKind::Star)));
    let options = ParticleOptions::new(Category::Star, constructor, STAR_SIZE);
    let stars = ParticleFactory::new(this.downgrade(), options, state.env.rng.clone())
        .and_then(|factory| {
            factory.create(CreateOptions::center(state.env.config.star_count as usize))
        });
    match stars {
        Ok(stars) => {
            for star in stars {
                star.set_transition(fade_in(state));
            }
        }
        Err(err) => tracing::error!(%err, "stars could not be created"),
    }
}

fn place_planet(this: &EntityRef, fraction: f64) {
    let (bounds, viewport) = (this.position(), this.viewport());
    let x = viewport.x + viewport.width / 2.0 - PLANET_SIZE / 2.0;
    let y = planet_y(&bounds, fraction);
    for planet in this.children(Category::Planet) {
        let mut planet = planet.borrow_mut();
        let position = planet.position_mut();
        position.x = x;
        position.y = y;
    }
}

pub(crate) fn on_resize(state: &CircadianState, this: &EntityRef) {
    let (bounds, viewport) = (this.position(), this.viewport());
    for planet in this.children(Category::Planet) {
        planet.borrow_mut().set_viewport(viewport);
    }
    for star in this.children(Category::Star) {
        star.borrow_mut().set_viewport(bounds);
    }
    place_planet(this, state.fraction.get());
}

/// Night overlay over the whole cycle box.
pub(crate) fn draw(state: &CircadianState, entity: &Entity, surface: &mut dyn DrawSurface) {
    let alpha = entity.transition_value_or(state.overlay_alpha.get());
    if alpha <= 0.0 {
        return;
    }
    let color = OVERLAY_COLOR.with_opacity(alpha);
    surface.fill_rect(entity.position().to_rect(), &Paint::Solid(color));
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/entities/circadian.rs"]
mod tests;
