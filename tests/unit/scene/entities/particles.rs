use super::*;
use crate::animation::transition::{Transition, TransitionParams};
use crate::assets::decode::{DecodedAsset, RasterImage};
use crate::assets::library::AssetMap;
use crate::foundation::core::BoundingBox;
use crate::host::Host;
use crate::render::recording::{DrawCommand, RecordingSurface};
use crate::render::surface::RenderContext;
use std::cell::RefCell;
use std::sync::Arc;

fn raster(width: u32, height: u32) -> DecodedAsset {
    DecodedAsset::Raster(Arc::new(RasterImage {
        width,
        height,
        rgba8_premul: Arc::new(vec![0; (width * height * 4) as usize]),
    }))
}

fn recording() -> (Rc<RefCell<RecordingSurface>>, RenderContext) {
    let surface = Rc::new(RefCell::new(RecordingSurface::new(200, 200)));
    let ctx = RenderContext::new(surface.clone());
    (surface, ctx)
}

fn particle(ctx: &RenderContext, bounds: BoundingBox, kind: ParticleKind) -> EntityRef {
    EntityRef::new(Entity::new(
        EntityParams::new(ctx.clone(), bounds),
        EntityKind::Particle(kind),
    ))
}

fn drawn(entity: &EntityRef, surface: &RefCell<RecordingSurface>) -> Vec<DrawCommand> {
    entity.update();
    entity.render();
    surface.borrow_mut().take_commands()
}

#[test]
fn rain_is_a_narrow_filled_streak() {
    let (surface, ctx) = recording();
    let drop = particle(&ctx, BoundingBox::new(10.0, 20.0, 40.0, 40.0), ParticleKind::Rain);
    let commands = drawn(&drop, &surface);
    match &commands[..] {
        [DrawCommand::FillRect { rect, paint, .. }] => {
            assert_eq!(*rect, Rect::new(10.0, 20.0, 10.0 + RAIN_WIDTH, 60.0));
            assert_eq!(*paint, Paint::Solid(RAIN_COLOR));
        }
        other => panic!("unexpected commands {other:?}"),
    }
}

#[test]
fn star_opacity_follows_its_transition() {
    let (host, _, _) = Host::manual(0);
    let (surface, ctx) = recording();
    let star = particle(&ctx, BoundingBox::new(5.0, 5.0, 2.0, 2.0), ParticleKind::Star);
    star.set_transition(Transition::new(TransitionParams::linear(0.0, 1.0, 100.0), &host));
    match &drawn(&star, &surface)[..] {
        [DrawCommand::FillPath {
            paint: Paint::Solid(color),
            ..
        }] => assert_eq!(color.a, 0),
        other => panic!("unexpected commands {other:?}"),
    }

    star.clear_transition();
    match &drawn(&star, &surface)[..] {
        [DrawCommand::FillPath {
            paint: Paint::Solid(color),
            ..
        }] => assert_eq!(*color, STAR_COLOR),
        other => panic!("unexpected commands {other:?}"),
    }
}

#[test]
fn image_particles_draw_nothing_until_assets_load() {
    let assets = Rc::new(SceneAssets::new());
    let (surface, ctx) = recording();
    let flake = particle(
        &ctx,
        BoundingBox::new(50.0, 50.0, 20.0, 20.0),
        ParticleKind::Snowflake(assets.clone()),
    );
    assert!(drawn(&flake, &surface).is_empty());

    let rng = Rng64::new(8);
    let cloud = EntityRef::new(new_cloud(
        EntityParams::new(ctx.clone(), BoundingBox::new(10.0, 10.0, 150.0, 150.0)),
        assets,
        &rng,
    ));
    assert_eq!((cloud.position().width, cloud.position().height), (1.0, 1.0));
    assert!(drawn(&cloud, &surface).is_empty());
}

#[test]
fn clouds_adopt_their_asset_size_once_loaded() {
    let assets = Rc::new(SceneAssets::new());
    let (surface, ctx) = recording();
    let rng = Rng64::new(8);
    let cloud = EntityRef::new(new_cloud(
        EntityParams::new(ctx, BoundingBox::new(10.0, 10.0, 150.0, 150.0)),
        assets.clone(),
        &rng,
    ));

    let map: AssetMap = CLOUD_URLS
        .iter()
        .map(|url| (url.to_string(), raster(120, 80)))
        .collect();
    assert!(assets.clouds.resolve(map));

    let commands = drawn(&cloud, &surface);
    assert_eq!((cloud.position().width, cloud.position().height), (120.0, 80.0));
    match &commands[..] {
        [DrawCommand::DrawImage { size, state, .. }] => {
            assert_eq!(*size, (120.0, 80.0));
            assert_eq!(state.shadow, Some(default_glow()));
        }
        other => panic!("unexpected commands {other:?}"),
    }
}

#[test]
fn snowflake_rotates_about_its_center() {
    let assets = Rc::new(SceneAssets::new());
    let mut map = AssetMap::new();
    map.insert(SNOWFLAKE_URL.to_string(), raster(16, 16));
    assert!(assets.snowflake.resolve(map));

    let (surface, ctx) = recording();
    let flake = EntityRef::new(Entity::new(
        EntityParams::new(ctx, BoundingBox::new(50.0, 50.0, 20.0, 20.0)).rotation_velocity(90.0),
        EntityKind::Particle(ParticleKind::Snowflake(assets)),
    ));
    let commands = drawn(&flake, &surface);
    match &commands[..] {
        [DrawCommand::DrawImage { dest, state, .. }] => {
            assert_eq!(*dest, Rect::new(-10.0, -10.0, 10.0, 10.0));
            let center = state.transform * kurbo::Point::new(0.0, 0.0);
            assert!((center.x - 60.0).abs() < 1e-9 && (center.y - 60.0).abs() < 1e-9);
            let tip = state.transform * kurbo::Point::new(1.0, 0.0);
            assert!((tip.x - 60.0).abs() < 1e-9 && (tip.y - 61.0).abs() < 1e-9);
        }
        other => panic!("unexpected commands {other:?}"),
    }
    assert_eq!(surface.borrow().save_depth(), 0);
}
