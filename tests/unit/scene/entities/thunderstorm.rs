use super::*;
use crate::host::clock::ManualClock;
use crate::host::scheduler::FrameQueue;
use crate::render::recording::{DrawCommand, RecordingSurface};
use crate::weather::store::WeatherStore;

fn storm() -> (EntityRef, Rc<ManualClock>, Rc<FrameQueue>, Rc<RefCell<RecordingSurface>>) {
    let (host, clock, queue) = Host::manual(0);
    let env = Rc::new(SceneEnv::new(host, Rc::new(WeatherStore::new())).with_seed(4));
    let surface = Rc::new(RefCell::new(RecordingSurface::new(400, 200)));
    let bounds = BoundingBox::from_size(400.0, 200.0);
    let sky = create_thunderstorm_sky(&env, RenderContext::new(surface.clone()), bounds, bounds);
    (sky, clock, queue, surface)
}

fn bolt_of(lightning: &EntityRef) -> Rc<LightningBolt> {
    match lightning.kind() {
        EntityKind::Particle(ParticleKind::Lightning(bolt)) => bolt,
        other => panic!("not lightning: {other:?}"),
    }
}

#[test]
fn bolt_starts_at_the_top_of_the_viewport() {
    let (sky, ..) = storm();
    let lightning = sky.first_child(Category::Lightning).unwrap();
    let points = bolt_of(&lightning).points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].y, 0.0);
    assert!((0.0..400.0).contains(&points[0].x));
    assert_eq!(lightning.position(), BoundingBox::from_size(400.0, 200.0));
}

#[test]
fn bolt_grows_downward_until_grounded() {
    let (sky, ..) = storm();
    let lightning = sky.first_child(Category::Lightning).unwrap();
    let bolt = bolt_of(&lightning);

    for _ in 0..25 {
        sky.update();
    }
    assert!(bolt.is_grounded());
    let points = bolt.points();
    assert!(points.last().unwrap().y >= 200.0);
    for pair in points.windows(2) {
        let step = pair[1] - pair[0];
        assert!(step.x.abs() <= X_STEP);
        assert!((MIN_Y_STEP..=MAX_Y_STEP).contains(&step.y));
    }
    let len = points.len();
    sky.update();
    assert_eq!(bolt.points().len(), len);
    assert_eq!(lightning.transition().map(|t| t.value()), Some(1.0));
}

#[test]
fn faded_bolt_is_replaced() {
    let (sky, clock, queue, _) = storm();
    let first = sky.first_child(Category::Lightning).unwrap();
    for _ in 0..25 {
        sky.update();
    }

    clock.advance(FADE_OUT_MS);
    queue.run_frame();
    let second = sky.first_child(Category::Lightning).unwrap();
    assert!(!second.ptr_eq(&first));
    assert_eq!(sky.child_count(Category::Lightning), 1);
    assert_eq!(bolt_of(&second).points().len(), 1);
    assert_eq!(first.listener_count(EventType::ExitFrame), 0);
}

#[test]
fn draws_a_glowing_polyline() {
    let (sky, _, _, surface) = storm();
    sky.update();
    sky.render();
    let commands = surface.borrow().commands().to_vec();
    let stroke = commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::StrokePath { width, state, .. } => Some((*width, *state)),
            _ => None,
        })
        .expect("bolt stroke");
    assert_eq!(stroke.0, LIGHTNING_WIDTH);
    assert!(stroke.1.shadow.is_some_and(|s| s.blur == LIGHTNING_BLUR));
    assert_eq!(surface.borrow().save_depth(), 0);
}
