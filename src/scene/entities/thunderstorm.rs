use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::animation::transition::{Transition, TransitionParams};
use crate::events::target::EventType;
use crate::foundation::core::{BezPath, BoundingBox, Point, Rgba8, Vec2};
use crate::foundation::math::Rng64;
use crate::host::Host;
use crate::render::glow::with_glow;
use crate::render::surface::{DrawSurface, Paint, RenderContext, Shadow};
use crate::scene::entity::{Category, Entity, EntityEvent, EntityParams, EntityRef};
use crate::scene::env::SceneEnv;
use crate::scene::kind::{EntityKind, ParticleKind};

pub const X_STEP: f64 = 30.0;
pub const MIN_Y_STEP: f64 = 10.0;
pub const MAX_Y_STEP: f64 = 50.0;
pub const FADE_OUT_MS: f64 = 1000.0;
pub const LIGHTNING_COLOR: Rgba8 = Rgba8::rgb(245, 245, 250);
pub const LIGHTNING_WIDTH: f64 = 3.0;
pub const LIGHTNING_BLUR: f64 = 6.0;

#[derive(Debug)]
pub struct ThunderstormState {
    env: Rc<SceneEnv>,
}

/// A bolt that grows one random segment per update until it reaches the bottom of its
/// viewport, then fades out and reports `ExitFrame`.
#[derive(Debug)]
pub struct LightningBolt {
    host: Host,
    rng: Rc<Rng64>,
    points: RefCell<Vec<Point>>,
    grounded: Cell<bool>,
}

impl LightningBolt {
    pub fn new(host: Host, rng: Rc<Rng64>, viewport: &BoundingBox) -> Self {
        let start = Point::new(viewport.x + rng.next_f64_01() * viewport.width, viewport.y);
        Self {
            host,
            rng,
            points: RefCell::new(vec![start]),
            grounded: Cell::new(false),
        }
    }

    pub fn points(&self) -> Vec<Point> {
        self.points.borrow().clone()
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded.get()
    }
}

pub fn create_thunderstorm_sky(
    env: &Rc<SceneEnv>,
    context: RenderContext,
    position: BoundingBox,
    viewport: BoundingBox,
) -> EntityRef {
    let state = Rc::new(ThunderstormState { env: env.clone() });
    let sky = EntityRef::new(Entity::new(
        EntityParams::new(context, position).viewport(viewport),
        EntityKind::ThunderstormSky(state.clone()),
    ));
    spawn_lightning(&state, &sky);
    sky
}

fn spawn_lightning(state: &ThunderstormState, sky: &EntityRef) {
    let viewport = sky.viewport();
    let bolt = LightningBolt::new(state.env.host.clone(), state.env.rng.clone(), &viewport);
    let lightning = EntityRef::new(Entity::new(
        EntityParams::new(sky.context(), viewport).viewport(viewport),
        EntityKind::Particle(ParticleKind::Lightning(Rc::new(bolt))),
    ));

    let weak_sky = sky.downgrade();
    lightning.add_listener(
        EventType::ExitFrame,
        Rc::new(move |event: &EntityEvent| {
            let Some(sky) = weak_sky.upgrade() else {
                return;
            };
            sky.remove_child(Category::Lightning, &event.target);
            event.target.destroy();
            if let EntityKind::ThunderstormSky(state) = sky.kind() {
                tracing::debug!("lightning replaced");
                spawn_lightning(&state, &sky);
            }
        }),
    );
    sky.add_child(Category::Lightning, lightning);
}

/// Extends the bolt by one segment; starts the fade once it touches the ground.
pub(crate) fn grow(bolt: &LightningBolt, this: &EntityRef) {
    if bolt.grounded.get() {
        return;
    }
    let next = {
        let mut points = bolt.points.borrow_mut();
        let Some(last) = points.last().copied() else {
            return;
        };
        let next = last
            + Vec2::new(
                bolt.rng.range(-X_STEP, X_STEP),
                bolt.rng.range(MIN_Y_STEP, MAX_Y_STEP),
            );
        points.push(next);
        next
    };
    if next.y < this.viewport().bottom() {
        return;
    }

    bolt.grounded.set(true);
    let fade = Transition::new(TransitionParams::linear(1.0, 0.0, FADE_OUT_MS), &bolt.host);
    let weak = this.downgrade();
    fade.add_listener(EventType::Complete, move |_| {
        if let Some(lightning) = weak.upgrade() {
            lightning.dispatch(EventType::ExitFrame);
        }
    });
    this.set_transition(fade);
}

pub(crate) fn draw_bolt(bolt: &LightningBolt, entity: &Entity, surface: &mut dyn DrawSurface) {
    let points = bolt.points.borrow();
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }
    let mut path = BezPath::new();
    path.move_to(*first);
    for point in rest {
        path.line_to(*point);
    }

    let color = LIGHTNING_COLOR.with_opacity(entity.transition_value_or(1.0));
    let glow = Shadow {
        color,
        blur: LIGHTNING_BLUR,
        offset: Vec2::ZERO,
    };
    with_glow(surface, glow, |s| {
        s.stroke_path(&path, &Paint::Solid(color), LIGHTNING_WIDTH);
    });
}

/// The bolt always spans the sky's viewport.
pub(crate) fn on_resize(this: &EntityRef) {
    let viewport = this.viewport();
    for lightning in this.children(Category::Lightning) {
        lightning.resize(Some(viewport), Some(viewport));
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/entities/thunderstorm.rs"]
mod tests;
