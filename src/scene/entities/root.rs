use std::rc::Rc;

use crate::foundation::core::BoundingBox;
use crate::render::surface::RenderContext;
use crate::scene::entities::{sky, wave};
use crate::scene::entity::{Category, Entity, EntityParams, EntityRef};
use crate::scene::env::SceneEnv;
use crate::scene::kind::EntityKind;

/// The sky reaches this far below the horizon, behind the wave.
pub const SKY_OVERHANG: f64 = 30.0;
pub const WAVE_VELOCITY: f64 = -1.0;

fn sky_box(frame: &BoundingBox) -> BoundingBox {
    BoundingBox::new(frame.x, frame.y, frame.width, frame.height / 2.0 + SKY_OVERHANG)
}

fn wave_box(x: f64, frame: &BoundingBox) -> BoundingBox {
    BoundingBox::new(x, frame.height / 2.0, wave::period(), frame.height)
}

/// Builds the whole scene under one root covering `frame`: background, sky, wave.
pub fn create_root(env: &Rc<SceneEnv>, context: RenderContext, frame: BoundingBox) -> EntityRef {
    let root = EntityRef::new(Entity::new(
        EntityParams::new(context.clone(), frame).viewport(frame),
        EntityKind::Root,
    ));

    let background = Entity::new(
        EntityParams::new(context.clone(), frame).viewport(frame),
        EntityKind::Background,
    );
    root.add_child(Category::Background, EntityRef::new(background));

    let sky = sky::create_sky(env, context.clone(), sky_box(&frame), frame);
    root.add_child(Category::Sky, sky);

    let wave = Entity::new(
        EntityParams::new(context, wave_box(frame.x, &frame))
            .viewport(frame)
            .velocity(WAVE_VELOCITY, 0.0),
        EntityKind::Wave,
    );
    root.add_child(Category::Wave, EntityRef::new(wave));

    root.set_frame_size(frame.width, frame.height);
    root
}

/// Re-lays out the root's children for its current position.
pub(crate) fn layout(this: &EntityRef) {
    let frame = this.position();
    for background in this.children(Category::Background) {
        background.resize(Some(frame), Some(frame));
    }
    for sky in this.children(Category::Sky) {
        sky.resize(Some(sky_box(&frame)), Some(frame));
    }
    for wave in this.children(Category::Wave) {
        let x = wave.position().x;
        wave.resize(Some(wave_box(x, &frame)), Some(frame));
    }
    this.set_frame_size(frame.width, frame.height);
}
