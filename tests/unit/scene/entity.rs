use super::*;
use crate::animation::transition::TransitionParams;
use crate::host::Host;
use crate::render::recording::{DrawCommand, RecordingSurface};
use std::cell::Cell;

fn recording(w: u32, h: u32) -> (Rc<RefCell<RecordingSurface>>, RenderContext) {
    let surface = Rc::new(RefCell::new(RecordingSurface::new(w, h)));
    let ctx = RenderContext::new(surface.clone());
    (surface, ctx)
}

fn group(ctx: &RenderContext, bounds: BoundingBox) -> EntityRef {
    EntityRef::new(Entity::new(
        EntityParams::new(ctx.clone(), bounds),
        EntityKind::Group,
    ))
}

fn counter(entity: &EntityRef, ty: EventType) -> Rc<Cell<u32>> {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    entity.add_listener(ty, Rc::new(move |_: &EntityEvent| c.set(c.get() + 1)));
    count
}

#[test]
fn non_finite_rotation_becomes_zero_and_viewport_defaults_to_surface() {
    let (_, ctx) = recording(320, 200);
    let bounds = BoundingBox {
        rotation: f64::NAN,
        ..BoundingBox::new(1.0, 2.0, 3.0, 4.0)
    };
    let e = Entity::new(EntityParams::new(ctx, bounds), EntityKind::Group);
    assert_eq!(e.position().rotation, 0.0);
    assert_eq!(e.viewport(), BoundingBox::from_size(320.0, 200.0));
    assert!(!e.is_visible());
    assert_eq!(e.frame_size(), (0.0, 0.0));
}

#[test]
fn construction_keeps_a_finite_rotation() {
    let (_, ctx) = recording(100, 100);
    let plain = Entity::new(
        EntityParams::new(ctx.clone(), BoundingBox::new(10.0, 20.0, 30.0, 40.0)),
        EntityKind::Group,
    );
    assert_eq!(plain.position().rotation, 0.0);

    let bounds = BoundingBox {
        rotation: 45.0,
        ..BoundingBox::new(10.0, 20.0, 30.0, 40.0)
    };
    let rotated = Entity::new(EntityParams::new(ctx, bounds), EntityKind::Group);
    let p = rotated.position();
    assert_eq!((p.x, p.y, p.width, p.height, p.rotation), (10.0, 20.0, 30.0, 40.0, 45.0));
}

#[test]
fn enter_and_exit_fire_once_per_transition() {
    let (_, ctx) = recording(100, 100);
    let e = EntityRef::new(Entity::new(
        EntityParams::new(ctx, BoundingBox::new(-50.0, 0.0, 10.0, 10.0)).velocity(60.0, 0.0),
        EntityKind::Group,
    ));
    let enters = counter(&e, EventType::EnterFrame);
    let exits = counter(&e, EventType::ExitFrame);

    e.update(); // x = 10
    assert!(e.is_visible());
    e.update(); // x = 70
    assert_eq!((enters.get(), exits.get()), (1, 0));

    e.update(); // x = 130
    e.update();
    assert!(!e.is_visible());
    assert_eq!((enters.get(), exits.get()), (1, 1));
}

#[test]
fn touching_the_viewport_edge_counts_as_visible() {
    let (_, ctx) = recording(100, 100);
    let e = group(&ctx, BoundingBox::new(100.0, 100.0, 5.0, 5.0));
    e.update();
    assert!(e.is_visible());
}

#[test]
fn rotation_integrates_by_rotation_velocity() {
    let (_, ctx) = recording(100, 100);
    let e = EntityRef::new(Entity::new(
        EntityParams::new(ctx, BoundingBox::new(0.0, 0.0, 1.0, 1.0)).rotation_velocity(2.5),
        EntityKind::Group,
    ));
    e.update();
    e.update();
    assert_eq!(e.position().rotation, 5.0);
}

#[test]
fn listener_may_destroy_its_target_during_update() {
    let (_, ctx) = recording(100, 100);
    let parent = group(&ctx, BoundingBox::from_size(100.0, 100.0));
    let child = EntityRef::new(Entity::new(
        EntityParams::new(ctx.clone(), BoundingBox::new(95.0, 0.0, 2.0, 2.0)).velocity(10.0, 0.0),
        EntityKind::Group,
    ));
    let weak_parent = parent.downgrade();
    child.add_listener(
        EventType::ExitFrame,
        Rc::new(move |event: &EntityEvent| {
            if let Some(parent) = weak_parent.upgrade() {
                parent.remove_child(Category::Particle, &event.target);
            }
            event.target.destroy();
        }),
    );
    parent.add_child(Category::Particle, child.clone());

    parent.update(); // never visible before: no exit
    let reentry = EntityRef::new(Entity::new(
        EntityParams::new(ctx, BoundingBox::new(0.0, 0.0, 2.0, 2.0)),
        EntityKind::Group,
    ));
    parent.add_child(Category::Particle, reentry);
    child.borrow_mut().set_position(BoundingBox::new(90.0, 0.0, 2.0, 2.0));
    parent.update(); // x = 100, visible
    parent.update(); // x = 110, exits and is removed
    assert_eq!(parent.child_count(Category::Particle), 1);
    assert_eq!(child.listener_count(EventType::ExitFrame), 0);
}

#[test]
fn destroy_drops_listeners_children_and_transition() {
    let (host, _, queue) = Host::manual(0);
    let (_, ctx) = recording(10, 10);
    let parent = group(&ctx, BoundingBox::from_size(10.0, 10.0));
    let child = group(&ctx, BoundingBox::from_size(1.0, 1.0));
    let child_exits = counter(&child, EventType::ExitFrame);
    parent.add_child(Category::Star, child.clone());
    counter(&parent, EventType::EnterFrame);
    parent.set_transition(Transition::new(
        TransitionParams::linear(0.0, 1.0, 100.0),
        &host,
    ));
    assert_eq!(queue.pending_count(), 1);

    parent.destroy();
    assert_eq!(parent.listener_count(EventType::EnterFrame), 0);
    assert_eq!(parent.child_count(Category::Star), 0);
    assert!(parent.transition().is_none());
    assert_eq!(queue.pending_count(), 0);
    assert_eq!(child.listener_count(EventType::ExitFrame), 0);
    child.dispatch(EventType::ExitFrame);
    assert_eq!(child_exits.get(), 0);
}

#[test]
fn frame_size_propagates_to_existing_and_new_children() {
    let (_, ctx) = recording(10, 10);
    let root = group(&ctx, BoundingBox::from_size(10.0, 10.0));
    let mid = group(&ctx, BoundingBox::from_size(10.0, 10.0));
    let leaf = group(&ctx, BoundingBox::from_size(1.0, 1.0));
    mid.add_child(Category::Sky, leaf.clone());
    root.add_child(Category::Sky, mid.clone());
    assert!(!leaf.is_render_context_valid());

    root.set_frame_size(800.0, 600.0);
    assert_eq!(leaf.frame_size(), (800.0, 600.0));

    let late = group(&ctx, BoundingBox::from_size(1.0, 1.0));
    mid.add_child(Category::Star, late.clone());
    assert_eq!(late.frame_size(), (800.0, 600.0));
    assert!(late.is_render_context_valid());
}

#[test]
fn add_child_without_frame_size_leaves_child_untouched() {
    let (_, ctx) = recording(10, 10);
    let parent = group(&ctx, BoundingBox::from_size(10.0, 10.0));
    let child = group(&ctx, BoundingBox::from_size(1.0, 1.0));
    child.set_frame_size(5.0, 5.0);
    parent.add_child(Category::Sky, child.clone());
    assert_eq!(child.frame_size(), (5.0, 5.0));
}

#[test]
fn remove_child_matches_identity_and_category() {
    let (_, ctx) = recording(10, 10);
    let parent = group(&ctx, BoundingBox::from_size(10.0, 10.0));
    let a = group(&ctx, BoundingBox::from_size(1.0, 1.0));
    let b = group(&ctx, BoundingBox::from_size(1.0, 1.0));
    parent.add_child(Category::Particle, a.clone());
    parent.add_child(Category::Particle, b.clone());

    assert!(!parent.remove_child(Category::Star, &b));
    assert!(parent.remove_child(Category::Particle, &b));
    assert!(!parent.remove_child(Category::Particle, &b));
    let rest = parent.children(Category::Particle);
    assert_eq!(rest.len(), 1);
    assert!(rest[0].ptr_eq(&a));
    assert!(parent.first_child(Category::Particle).is_some_and(|c| c.ptr_eq(&a)));
}

#[test]
fn resize_keeps_rotation() {
    let (_, ctx) = recording(10, 10);
    let bounds = BoundingBox {
        rotation: 45.0,
        ..BoundingBox::new(0.0, 0.0, 1.0, 1.0)
    };
    let e = group(&ctx, bounds);
    e.resize(Some(BoundingBox::new(5.0, 6.0, 7.0, 8.0)), None);
    let p = e.position();
    assert_eq!((p.x, p.y, p.width, p.height, p.rotation), (5.0, 6.0, 7.0, 8.0, 45.0));
    assert_eq!(e.viewport(), BoundingBox::from_size(10.0, 10.0));
}

#[test]
fn render_skips_invisible_subtrees() {
    let (surface, ctx) = recording(100, 100);
    let background = EntityRef::new(Entity::new(
        EntityParams::new(ctx.clone(), BoundingBox::from_size(100.0, 100.0)),
        EntityKind::Background,
    ));
    background.render();
    assert!(surface.borrow().commands().is_empty());

    background.update();
    background.render();
    let commands = surface.borrow().commands().to_vec();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], DrawCommand::FillRect { .. }));
}

#[test]
fn set_render_context_reaches_grandchildren() {
    let (_, old) = recording(10, 10);
    let (_, new) = recording(20, 20);
    let root = group(&old, BoundingBox::from_size(10.0, 10.0));
    let child = group(&old, BoundingBox::from_size(1.0, 1.0));
    let grandchild = group(&old, BoundingBox::from_size(1.0, 1.0));
    child.add_child(Category::Star, grandchild.clone());
    root.add_child(Category::Sky, child);

    root.set_render_context(new.clone());
    assert!(grandchild.context().ptr_eq(&new));
}
