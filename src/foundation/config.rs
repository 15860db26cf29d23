use crate::foundation::error::{WeatherscapeError, WeatherscapeResult};
use anyhow::Context;
use std::path::Path;

/// Environment variable overriding [`SceneConfig::fps`].
pub const FPS_ENV: &str = "WEATHERSCAPE_FPS";

/// Tuning knobs for a scene. Every field has a default so partial JSON is accepted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Target frame rate of the frame limiter.
    pub fps: f64,
    /// Show snow between 1 and 26 December regardless of the reported weather.
    pub seasonal_snow: bool,
    /// Overlay alpha at full night.
    pub night_overlay_alpha: f64,
    pub overlay_fade_ms: f64,
    pub planet_fade_ms: f64,
    pub star_count: u32,
    pub weather_enabled: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            seasonal_snow: true,
            night_overlay_alpha: 0.5,
            overlay_fade_ms: 2000.0,
            planet_fade_ms: 1500.0,
            star_count: 40,
            weather_enabled: true,
        }
    }
}

impl SceneConfig {
    pub fn from_json_str(s: &str) -> WeatherscapeResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| WeatherscapeError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> WeatherscapeResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> WeatherscapeResult<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(WeatherscapeError::configuration(format!(
                "fps must be finite and > 0, got {}",
                self.fps
            )));
        }
        if !(0.0..=1.0).contains(&self.night_overlay_alpha) {
            return Err(WeatherscapeError::configuration(
                "night_overlay_alpha must be within [0, 1]",
            ));
        }
        for (name, v) in [
            ("overlay_fade_ms", self.overlay_fade_ms),
            ("planet_fade_ms", self.planet_fade_ms),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(WeatherscapeError::configuration(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }

    /// Applies `WEATHERSCAPE_FPS` when it is set to a positive number; other values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(fps) = std::env::var(FPS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
        {
            self.fps = fps;
        }
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
