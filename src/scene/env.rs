use std::rc::Rc;

use crate::assets::library::SceneAssets;
use crate::foundation::config::SceneConfig;
use crate::foundation::math::Rng64;
use crate::host::Host;
use crate::weather::flags::FeatureFlags;
use crate::weather::store::WeatherSource;

/// Services shared by every entity of one scene, assembled at the composition root.
#[derive(Clone)]
pub struct SceneEnv {
    pub host: Host,
    pub rng: Rc<Rng64>,
    pub assets: Rc<SceneAssets>,
    pub weather: Rc<dyn WeatherSource>,
    pub flags: Rc<FeatureFlags>,
    pub config: Rc<SceneConfig>,
}

impl SceneEnv {
    /// Default config, entropy-seeded randomness, unloaded assets.
    pub fn new(host: Host, weather: Rc<dyn WeatherSource>) -> Self {
        let config = SceneConfig::default();
        Self {
            host,
            rng: Rc::new(Rng64::from_entropy()),
            assets: Rc::new(SceneAssets::new()),
            weather,
            flags: Rc::new(FeatureFlags::new(config.weather_enabled)),
            config: Rc::new(config),
        }
    }

    /// Also resets the feature flag to the config's `weather_enabled`.
    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.flags = Rc::new(FeatureFlags::new(config.weather_enabled));
        self.config = Rc::new(config);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rc::new(Rng64::new(seed));
        self
    }

    pub fn with_assets(mut self, assets: Rc<SceneAssets>) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_flags(mut self, flags: Rc<FeatureFlags>) -> Self {
        self.flags = flags;
        self
    }
}

impl std::fmt::Debug for SceneEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneEnv")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("weather", &self.weather.weather())
            .finish_non_exhaustive()
    }
}
