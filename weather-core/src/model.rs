use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;

/// Geographic position in decimal degrees.
///
/// Serialized with the upstream field names (`lat` / `lon`) so the same type
/// works for forecast payloads and for the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ModelError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ModelError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ModelError::LongitudeOutOfRange(longitude));
        }
        Ok(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A non-empty city name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CityQuery(String);

impl CityQuery {
    pub fn new(name: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyCity);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `city` block of the forecast payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub coord: Coordinate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `main` block of a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMain {
    pub temp: f64,
    pub humidity: u8,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a sample's `weather` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleWeather {
    pub main: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleWind {
    pub speed: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One 3-hour forecast sample, kept in the upstream shape.
///
/// Fields the dashboard does not read are preserved in `extra` so a sample
/// serializes back to what the upstream sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub dt_txt: String,
    pub main: SampleMain,
    #[serde(default)]
    pub weather: Vec<SampleWeather>,
    pub wind: SampleWind,
    /// Probability of precipitation, 0.0..=1.0.
    #[serde(default)]
    pub pop: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastSample {
    /// Sample time, or `None` if `dt_txt` is not a recognizable date-time.
    ///
    /// Accepts the upstream `YYYY-MM-DD HH:MM:SS` form, the same with a `T`
    /// separator, and RFC 3339.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.dt_txt.trim();
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
    }

    pub fn temperature(&self) -> f64 {
        self.main.temp
    }

    pub fn humidity(&self) -> u8 {
        self.main.humidity
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind.speed
    }

    pub fn precipitation_probability(&self) -> f64 {
        self.pop
    }

    /// Primary condition label (`weather[0].main`), e.g. "Clear" or "Rain".
    pub fn condition(&self) -> Option<&str> {
        self.weather.first().map(|w| w.main.as_str())
    }

    /// Precipitation probability as a whole percentage in `0..=100`.
    pub fn rain_percent(&self) -> u8 {
        (self.pop * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Parsed forecast payload: the city and its chronological samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub city: City,
    pub list: Vec<ForecastSample>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastResponse {
    pub fn samples(&self) -> &[ForecastSample] {
        &self.list
    }

    pub fn city_name(&self) -> &str {
        &self.city.name
    }

    pub fn coordinate(&self) -> Coordinate {
        self.city.coord
    }
}
