use std::cell::Cell;
use std::rc::Rc;

use chrono::Datelike;

use crate::events::target::ListenerId;
use crate::foundation::core::BoundingBox;
use crate::render::surface::RenderContext;
use crate::scene::entities::circadian;
use crate::scene::entity::{Category, Entity, EntityParams, EntityRef};
use crate::scene::env::SceneEnv;
use crate::scene::kind::EntityKind;
use crate::scene::weather_factory::{WeatherEntityFactory, WeatherSkyKind};
use crate::weather::condition::WeatherCondition;
use crate::weather::store::WeatherEvent;

/// Last day of December that still gets seasonal snow.
pub const SNOW_SEASON_LAST_DAY: u32 = 26;

pub struct SkyState {
    env: Rc<SceneEnv>,
    subscription: Cell<Option<ListenerId>>,
    shown: Cell<Option<WeatherSkyKind>>,
}

impl SkyState {
    /// Weather sky currently on display.
    pub fn shown(&self) -> Option<WeatherSkyKind> {
        self.shown.get()
    }
}

impl std::fmt::Debug for SkyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkyState")
            .field("shown", &self.shown.get())
            .finish_non_exhaustive()
    }
}

/// Sky container: the circadian cycle plus at most one weather sky, kept in sync
/// with the weather source.
pub fn create_sky(
    env: &Rc<SceneEnv>,
    context: RenderContext,
    position: BoundingBox,
    viewport: BoundingBox,
) -> EntityRef {
    let state = Rc::new(SkyState {
        env: env.clone(),
        subscription: Cell::new(None),
        shown: Cell::new(None),
    });
    let sky = EntityRef::new(Entity::new(
        EntityParams::new(context.clone(), position).viewport(viewport),
        EntityKind::Sky(state.clone()),
    ));

    let cycle = circadian::create_circadian(env, context, position, viewport);
    sky.add_child(Category::CircadianCycle, cycle);

    let weak = sky.downgrade();
    let id = env.weather.add_listener(Rc::new(move |_: &WeatherEvent| {
        let Some(sky) = weak.upgrade() else {
            return;
        };
        if let EntityKind::Sky(state) = sky.kind() {
            refresh_weather_sky(&state, &sky);
        }
    }));
    state.subscription.set(Some(id));

    refresh_weather_sky(&state, &sky);
    sky
}

/// True from 1 to 26 December, local time.
pub fn is_snow_season(epoch_secs: i64) -> bool {
    chrono::DateTime::from_timestamp(epoch_secs, 0)
        .map(|utc| utc.with_timezone(&chrono::Local))
        .is_some_and(|date| date.month() == 12 && date.day() <= SNOW_SEASON_LAST_DAY)
}

/// Condition the sky should show right now, if any.
pub fn desired_condition(env: &SceneEnv) -> Option<WeatherCondition> {
    if env.config.seasonal_snow && is_snow_season(env.host.clock.now_epoch_secs()) {
        return Some(WeatherCondition::Snow);
    }
    if !env.flags.is_weather_enabled() {
        return None;
    }
    env.weather.weather().map(|w| w.condition())
}

/// Swaps the weather sky when the wanted one differs from what is shown.
pub(crate) fn refresh_weather_sky(state: &SkyState, this: &EntityRef) {
    let condition = desired_condition(&state.env);
    let wanted = condition.and_then(WeatherSkyKind::for_condition);
    if wanted == state.shown.get() {
        return;
    }

    for old in this.children(Category::WeatherSky) {
        this.remove_child(Category::WeatherSky, &old);
        old.destroy();
    }
    state.shown.set(wanted);

    let Some(condition) = condition else {
        tracing::debug!("weather sky cleared");
        return;
    };
    match WeatherEntityFactory::new(state.env.clone(), this.clone()).create(condition) {
        Ok(Some(sky)) => {
            tracing::debug!(?wanted, %condition, "weather sky changed");
            this.add_child(Category::WeatherSky, sky);
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!(%err, %condition, "weather sky could not be built");
        }
    }
}

/// Children share the sky's bounds.
pub(crate) fn forward_resize(this: &EntityRef) {
    let (position, viewport) = (this.position(), this.viewport());
    for child in this.all_children() {
        child.resize(Some(position), Some(viewport));
    }
}

pub(crate) fn unsubscribe(state: &SkyState) {
    if let Some(id) = state.subscription.take() {
        state.env.weather.remove_listener(id);
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/scene/entities/sky.rs"]
mod tests;
