/// Convenience result type used across weatherscape.
pub type WeatherscapeResult<T> = Result<T, WeatherscapeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum WeatherscapeError {
    /// Programmer error in scene or factory configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Asset could not be read or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Weather payload could not be interpreted.
    #[error("weather error: {0}")]
    Weather(String),

    /// Drawing surface could not be created or read back.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WeatherscapeError {
    /// Build a [`WeatherscapeError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`WeatherscapeError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`WeatherscapeError::Weather`] value.
    pub fn weather(msg: impl Into<String>) -> Self {
        Self::Weather(msg.into())
    }

    /// Build a [`WeatherscapeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`WeatherscapeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
