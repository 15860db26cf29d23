use super::*;
use crate::render::recording::RecordingSurface;
use crate::render::surface::RenderContext;
use crate::scene::kind::EntityKind;
use std::collections::HashSet;

fn parent(width: f64, height: f64) -> EntityRef {
    let ctx = RenderContext::from_surface(RecordingSurface::new(width as u32, height as u32));
    EntityRef::new(Entity::new(
        EntityParams::new(ctx, BoundingBox::from_size(width, height)),
        EntityKind::Group,
    ))
}

fn plain(size: Range) -> ParticleOptions {
    let constructor: ParticleConstructor = Rc::new(|params| Entity::new(params, EntityKind::Group));
    ParticleOptions::new(Category::Particle, constructor, size)
}

fn edge(side: BoxSide, y: Range) -> EdgeEntry {
    EdgeEntry {
        side,
        x: Range::ZERO,
        y,
    }
}

#[test]
fn center_spawn_creates_requested_count_inside_extended_bounds() {
    let p = parent(200.0, 100.0);
    let factory = ParticleFactory::new(
        p.downgrade(),
        plain(Range::new(10.0, 20.0)),
        Rc::new(Rng64::new(1)),
    )
    .unwrap();

    let created = factory.create(CreateOptions::center(25)).unwrap();
    assert_eq!(created.len(), 25);
    assert_eq!(p.child_count(Category::Particle), 25);
    for particle in &created {
        let pos = particle.position();
        assert!((10.0..=20.0).contains(&pos.width));
        assert_eq!(pos.width, pos.height);
        assert!(pos.x >= -pos.width && pos.x < 200.0);
        assert!(pos.y >= -pos.height && pos.y < 100.0);
        assert_eq!(particle.viewport(), BoundingBox::from_size(200.0, 100.0));
    }
}

#[test]
fn spawn_positions_are_offset_by_parent_origin() {
    let ctx = RenderContext::from_surface(RecordingSurface::new(10, 10));
    let p = EntityRef::new(Entity::new(
        EntityParams::new(ctx, BoundingBox::new(1000.0, 500.0, 50.0, 50.0)),
        EntityKind::Group,
    ));
    let mut options = plain(Range::new(5.0, 5.0));
    options.edges = vec![edge(BoxSide::Left, Range::ZERO)];
    let factory = ParticleFactory::new(p.downgrade(), options, Rc::new(Rng64::new(3))).unwrap();

    for particle in factory.create(CreateOptions::edge(10)).unwrap() {
        let pos = particle.position();
        assert_eq!(pos.x, 1000.0 - 5.0);
        assert!(pos.y >= 500.0 && pos.y < 550.0);
    }
}

#[test]
fn edge_spawn_without_edges_is_a_configuration_error() {
    let p = parent(10.0, 10.0);
    let factory =
        ParticleFactory::new(p.downgrade(), plain(Range::new(1.0, 2.0)), Rc::new(Rng64::new(1)))
            .unwrap();
    let err = factory.create(CreateOptions::edge(1)).unwrap_err();
    assert!(matches!(err, WeatherscapeError::Configuration(_)));
    assert_eq!(p.child_count(Category::Particle), 0);
}

#[test]
fn placement_uses_the_constructed_size() {
    let p = parent(300.0, 100.0);
    let shrink: ParticleConstructor = Rc::new(|mut params: EntityParams| {
        params.position.width = 1.0;
        params.position.height = 1.0;
        Entity::new(params, EntityKind::Group)
    });
    let mut options = ParticleOptions::new(Category::Particle, shrink, Range::new(100.0, 200.0));
    options.velocity.x = Range::new(-1.0, -1.0);
    options.edges = vec![edge(BoxSide::Right, Range::ZERO)];
    options.edges[0].x = Range::new(-1.0, -1.0);
    let factory =
        ParticleFactory::new_self_replacing(p.downgrade(), options, Rc::new(Rng64::new(4)))
            .unwrap();

    let initial = factory.create(CreateOptions::center(200)).unwrap();
    for particle in &initial {
        let pos = particle.position();
        assert!(pos.x >= -1.0 && pos.y >= -1.0, "{pos:?}");
        assert!(particle.is_visible());
    }

    for _ in 0..400 {
        p.update();
    }
    let current = p.children(Category::Particle);
    assert_eq!(current.len(), 200);
    assert!(current.iter().all(|c| initial.iter().all(|i| !i.ptr_eq(c))));
}

#[test]
fn spawned_particles_fire_enter_frame_once() {
    let p = parent(50.0, 50.0);
    let enters = Rc::new(std::cell::Cell::new(0u32));
    let mut options = plain(Range::new(5.0, 5.0));
    let counter = enters.clone();
    options.enter_listener = Some(Rc::new(move |_: &EntityEvent| counter.set(counter.get() + 1)));
    let factory = ParticleFactory::new(p.downgrade(), options, Rc::new(Rng64::new(6))).unwrap();

    factory.create(CreateOptions::center(4)).unwrap();
    p.update();
    assert_eq!(enters.get(), 4);
}

#[test]
fn dropped_parent_is_an_error() {
    let p = parent(10.0, 10.0);
    let factory =
        ParticleFactory::new(p.downgrade(), plain(Range::new(1.0, 2.0)), Rc::new(Rng64::new(1)))
            .unwrap();
    drop(p);
    assert!(factory.create(CreateOptions::center(1)).is_err());
}

#[test]
fn non_finite_ranges_are_rejected() {
    let p = parent(10.0, 10.0);
    let mut options = plain(Range::new(1.0, 2.0));
    options.velocity.x = Range::new(0.0, f64::INFINITY);
    assert!(ParticleFactory::new(p.downgrade(), options, Rc::new(Rng64::new(1))).is_err());

    let mut options = plain(Range::new(1.0, 2.0));
    options.edges = vec![edge(BoxSide::Top, Range::new(f64::NAN, 1.0))];
    assert!(ParticleFactory::new(p.downgrade(), options, Rc::new(Rng64::new(1))).is_err());
}

#[test]
fn edge_spawn_uses_edge_placement_and_velocity() {
    let p = parent(300.0, 100.0);
    let mut options = plain(Range::new(8.0, 8.0));
    options.velocity.y = Range::new(-100.0, -100.0);
    options.edges = vec![edge(BoxSide::Top, Range::new(5.0, 5.0))];
    let factory = ParticleFactory::new(p.downgrade(), options, Rc::new(Rng64::new(9))).unwrap();

    for particle in factory.create(CreateOptions::edge(20)).unwrap() {
        let pos = particle.position();
        assert_eq!(pos.y, -8.0);
        assert!(pos.x >= 0.0 && pos.x < 300.0);
        assert_eq!(particle.borrow().velocity(), (0.0, 5.0));
    }
}

#[test]
fn edge_choice_is_weighted_by_side_length() {
    let p = parent(300.0, 100.0);
    let mut options = plain(Range::new(1.0, 1.0));
    options.edges = vec![
        edge(BoxSide::Top, Range::ZERO),
        edge(BoxSide::Right, Range::ZERO),
    ];
    let factory = ParticleFactory::new(p.downgrade(), options, Rc::new(Rng64::new(42))).unwrap();

    let created = factory.create(CreateOptions::edge(2000)).unwrap();
    let top = created.iter().filter(|e| e.position().y == -1.0).count();
    let right = created.iter().filter(|e| e.position().x == 300.0).count();
    assert_eq!(top + right, 2000);
    let share = top as f64 / 2000.0;
    assert!((share - 0.75).abs() < 0.05, "top share {share}");
}

#[test]
fn zero_length_edges_fall_back_to_uniform_choice() {
    let p = parent(0.0, 0.0);
    let mut options = plain(Range::new(2.0, 2.0));
    options.edges = vec![
        edge(BoxSide::Bottom, Range::ZERO),
        edge(BoxSide::Left, Range::ZERO),
    ];
    let factory = ParticleFactory::new(p.downgrade(), options, Rc::new(Rng64::new(5))).unwrap();

    let created = factory.create(CreateOptions::edge(200)).unwrap();
    let left = created.iter().filter(|e| e.position().x == -2.0).count();
    assert!(left > 0 && left < 200);
}

#[test]
fn listeners_are_attached_to_every_particle() {
    let p = parent(10.0, 10.0);
    let mut options = plain(Range::new(1.0, 1.0));
    let noop: Listener<EntityEvent> = Rc::new(|_: &EntityEvent| {});
    options.enter_listener = Some(noop.clone());
    options.exit_listener = Some(noop);
    let factory = ParticleFactory::new(p.downgrade(), options, Rc::new(Rng64::new(1))).unwrap();

    for particle in factory.create(CreateOptions::center(3)).unwrap() {
        assert_eq!(particle.listener_count(EventType::EnterFrame), 1);
        assert_eq!(particle.listener_count(EventType::ExitFrame), 1);
    }
}

#[test]
fn self_replacing_requires_edges() {
    let p = parent(10.0, 10.0);
    let err = ParticleFactory::new_self_replacing(
        p.downgrade(),
        plain(Range::new(1.0, 1.0)),
        Rc::new(Rng64::new(1)),
    )
    .unwrap_err();
    assert!(matches!(err, WeatherscapeError::Configuration(_)));
}

#[test]
fn self_replacing_particles_keep_the_population_constant() {
    let p = parent(100.0, 100.0);
    let mut options = plain(Range::new(10.0, 10.0));
    options.velocity.y = Range::new(5.0, 5.0);
    options.edges = vec![edge(BoxSide::Top, Range::new(5.0, 5.0))];
    let factory =
        ParticleFactory::new_self_replacing(p.downgrade(), options, Rc::new(Rng64::new(11)))
            .unwrap();

    let initial: HashSet<u64> = factory
        .create(CreateOptions::center(3))
        .unwrap()
        .iter()
        .map(EntityRef::id)
        .collect();

    for _ in 0..60 {
        p.update();
        assert_eq!(p.child_count(Category::Particle), 3);
    }
    let current: HashSet<u64> = p
        .children(Category::Particle)
        .iter()
        .map(EntityRef::id)
        .collect();
    assert_ne!(initial, current);
}

#[test]
fn replace_spawns_at_an_edge() {
    let p = parent(100.0, 100.0);
    let mut options = plain(Range::new(4.0, 4.0));
    options.edges = vec![edge(BoxSide::Top, Range::ZERO)];
    let factory =
        ParticleFactory::new_self_replacing(p.downgrade(), options, Rc::new(Rng64::new(2)))
            .unwrap();
    let old = factory.create(CreateOptions::center(1)).unwrap().remove(0);

    factory.replace(&old);
    let children = p.children(Category::Particle);
    assert_eq!(children.len(), 1);
    assert!(!children[0].ptr_eq(&old));
    assert_eq!(children[0].position().y, -4.0);
    assert_eq!(old.listener_count(EventType::ExitFrame), 0);
}

#[test]
fn side_length_matches_box_dimensions() {
    let b = BoundingBox::from_size(30.0, 7.0);
    assert_eq!(side_length(BoxSide::Top, &b), 30.0);
    assert_eq!(side_length(BoxSide::Bottom, &b), 30.0);
    assert_eq!(side_length(BoxSide::Left, &b), 7.0);
    assert_eq!(side_length(BoxSide::Right, &b), 7.0);
}
