use crate::foundation::error::{WeatherscapeError, WeatherscapeResult};
use crate::weather::condition::WeatherCondition;

/// Latest weather reading as consumed by the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WeatherSnapshot {
    pub sunrise_epoch_seconds: i64,
    pub sunset_epoch_seconds: i64,
    pub condition_code: u32,
}

#[derive(serde::Deserialize)]
struct ResponseDto {
    weather: WeatherDto,
    geo: GeoDto,
}

#[derive(serde::Deserialize)]
struct WeatherDto {
    categories: Vec<CategoryDto>,
}

#[derive(serde::Deserialize)]
struct CategoryDto {
    code: u32,
}

#[derive(serde::Deserialize)]
struct GeoDto {
    sunrise: i64,
    sunset: i64,
}

impl WeatherSnapshot {
    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_code(self.condition_code)
    }

    /// Reads the weather API response body; only the first category is used.
    pub fn from_response_json(body: &str) -> WeatherscapeResult<Self> {
        let dto: ResponseDto =
            serde_json::from_str(body).map_err(|e| WeatherscapeError::serde(e.to_string()))?;
        let first = dto
            .weather
            .categories
            .first()
            .ok_or_else(|| WeatherscapeError::weather("response has no weather categories"))?;
        Ok(Self {
            sunrise_epoch_seconds: dto.geo.sunrise,
            sunset_epoch_seconds: dto.geo.sunset,
            condition_code: first.code,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/weather/snapshot.rs"]
mod tests;
