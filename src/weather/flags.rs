use std::cell::Cell;

/// Mutable feature switches read by the scene every frame.
#[derive(Debug)]
pub struct FeatureFlags {
    weather_enabled: Cell<bool>,
}

impl FeatureFlags {
    pub fn new(weather_enabled: bool) -> Self {
        Self {
            weather_enabled: Cell::new(weather_enabled),
        }
    }

    pub fn is_weather_enabled(&self) -> bool {
        self.weather_enabled.get()
    }

    pub fn set_weather_enabled(&self, enabled: bool) {
        self.weather_enabled.set(enabled);
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::new(true)
    }
}
