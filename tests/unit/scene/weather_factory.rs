use super::*;
use crate::foundation::core::BoundingBox;
use crate::host::Host;
use crate::render::recording::RecordingSurface;
use crate::render::surface::RenderContext;
use crate::scene::entity::{Category, Entity, EntityParams};
use crate::scene::kind::EntityKind;
use crate::weather::store::WeatherStore;

fn factory() -> WeatherEntityFactory {
    let (host, _, _) = Host::manual(0);
    let env = Rc::new(SceneEnv::new(host, Rc::new(WeatherStore::new())).with_seed(7));
    let ctx = RenderContext::from_surface(RecordingSurface::new(800, 600));
    let parent = EntityRef::new(Entity::new(
        EntityParams::new(ctx, BoundingBox::from_size(800.0, 330.0)),
        EntityKind::Group,
    ));
    WeatherEntityFactory::new(env, parent)
}

#[test]
fn conditions_map_to_sky_kinds() {
    use WeatherCondition as C;
    assert_eq!(WeatherSkyKind::for_condition(C::Clouds), Some(WeatherSkyKind::Clouds));
    assert_eq!(WeatherSkyKind::for_condition(C::Rain), Some(WeatherSkyKind::Rain));
    assert_eq!(WeatherSkyKind::for_condition(C::Drizzle), Some(WeatherSkyKind::Rain));
    assert_eq!(WeatherSkyKind::for_condition(C::Snow), Some(WeatherSkyKind::Snow));
    assert_eq!(
        WeatherSkyKind::for_condition(C::Thunderstorm),
        Some(WeatherSkyKind::Thunderstorm)
    );
    for none in [C::Clear, C::Unknown, C::Mist, C::Fog, C::Tornado] {
        assert_eq!(WeatherSkyKind::for_condition(none), None);
    }
}

#[test]
fn clear_sky_has_no_weather_entity() {
    assert!(factory().create(WeatherCondition::Clear).unwrap().is_none());
}

#[test]
fn particle_skies_are_filled_and_sized_to_the_parent() {
    let f = factory();
    for (condition, name, count) in [
        (WeatherCondition::Rain, "rain-sky", 100),
        (WeatherCondition::Clouds, "cloud-sky", 30),
        (WeatherCondition::Snow, "snow-sky", 25),
    ] {
        let sky = f.create(condition).unwrap().unwrap();
        assert_eq!(sky.kind().name(), name);
        assert_eq!(sky.position(), BoundingBox::from_size(800.0, 330.0));
        assert_eq!(sky.child_count(Category::Particle), count);
    }
}

#[test]
fn thunderstorm_sky_starts_with_one_bolt() {
    let sky = factory().create(WeatherCondition::Thunderstorm).unwrap().unwrap();
    assert_eq!(sky.kind().name(), "thunderstorm-sky");
    assert_eq!(sky.child_count(Category::Lightning), 1);
}

#[test]
fn cloud_sky_without_assets_cycles_every_cloud() {
    let sky = factory().create(WeatherCondition::Clouds).unwrap().unwrap();
    let initial = sky.children(Category::Particle);
    assert!(initial.iter().all(EntityRef::is_visible));

    for _ in 0..5_000 {
        sky.update();
    }
    let current = sky.children(Category::Particle);
    assert_eq!(current.len(), 30);
    assert!(current.iter().all(|c| initial.iter().all(|i| !i.ptr_eq(c))));
}
