use std::rc::Rc;

use crate::foundation::error::WeatherscapeResult;
use crate::scene::entities::particle_sky::{SkyPreset, create_particle_sky};
use crate::scene::entities::thunderstorm::create_thunderstorm_sky;
use crate::scene::entity::EntityRef;
use crate::scene::env::SceneEnv;
use crate::weather::condition::WeatherCondition;

/// Weather skies the scene knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeatherSkyKind {
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
}

impl WeatherSkyKind {
    /// `None` for conditions without a sky of their own.
    pub fn for_condition(condition: WeatherCondition) -> Option<Self> {
        match condition {
            WeatherCondition::Clouds => Some(Self::Clouds),
            WeatherCondition::Rain | WeatherCondition::Drizzle => Some(Self::Rain),
            WeatherCondition::Snow => Some(Self::Snow),
            WeatherCondition::Thunderstorm => Some(Self::Thunderstorm),
            _ => None,
        }
    }
}

/// Builds the weather sky for a condition, sized to its parent.
#[derive(Debug)]
pub struct WeatherEntityFactory {
    env: Rc<SceneEnv>,
    parent: EntityRef,
}

impl WeatherEntityFactory {
    pub fn new(env: Rc<SceneEnv>, parent: EntityRef) -> Self {
        Self { env, parent }
    }

    /// `Ok(None)` when the condition has no sky; that is not an error.
    pub fn create(&self, condition: WeatherCondition) -> WeatherscapeResult<Option<EntityRef>> {
        let Some(kind) = WeatherSkyKind::for_condition(condition) else {
            return Ok(None);
        };
        let (context, position, viewport) = {
            let parent = self.parent.borrow();
            (parent.context().clone(), parent.position(), parent.viewport())
        };
        let preset = match kind {
            WeatherSkyKind::Clouds => SkyPreset::Clouds,
            WeatherSkyKind::Rain => SkyPreset::Rain,
            WeatherSkyKind::Snow => SkyPreset::Snow,
            WeatherSkyKind::Thunderstorm => {
                let sky = create_thunderstorm_sky(&self.env, context, position, viewport);
                return Ok(Some(sky));
            }
        };
        create_particle_sky(preset, &self.env, context, position, viewport).map(Some)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/weather_factory.rs"]
mod tests;
