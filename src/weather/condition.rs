/// Weather classification derived from OpenWeather condition codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum WeatherCondition {
    Unknown,
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Mist,
    Smoke,
    Haze,
    Dust,
    Fog,
    Sand,
    Ash,
    Squall,
    Tornado,
    Clear,
    Clouds,
}

impl WeatherCondition {
    /// See <https://openweathermap.org/weather-conditions>. Unlisted codes map to `Unknown`.
    pub fn from_code(code: u32) -> Self {
        match code {
            200..=202 | 210..=212 | 221 | 230..=232 => Self::Thunderstorm,
            300..=302 | 310..=314 | 321 => Self::Drizzle,
            500..=504 | 511 | 520..=522 | 531 => Self::Rain,
            600..=602 | 611..=613 | 615 | 616 | 620..=622 => Self::Snow,
            701 => Self::Mist,
            711 => Self::Smoke,
            721 => Self::Haze,
            731 | 761 => Self::Dust,
            741 => Self::Fog,
            751 => Self::Sand,
            762 => Self::Ash,
            771 => Self::Squall,
            781 => Self::Tornado,
            800 => Self::Clear,
            801..=804 => Self::Clouds,
            _ => Self::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Thunderstorm => "Thunderstorm",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
            Self::Smoke => "Smoke",
            Self::Haze => "Haze",
            Self::Dust => "Dust",
            Self::Fog => "Fog",
            Self::Sand => "Sand",
            Self::Ash => "Ash",
            Self::Squall => "Squall",
            Self::Tornado => "Tornado",
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/weather/condition.rs"]
mod tests;
