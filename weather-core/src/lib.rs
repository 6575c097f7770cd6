//! Core library for the `weather-dash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration (TOML file plus environment overrides)
//! - Location resolution with a fallback city
//! - The OpenWeather forecast client
//! - Derived views (today / week / current conditions) and the view-state controller
//!
//! It is used by `weather-dash`, but can also be reused by other front ends.

pub mod condition;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod location;
pub mod map;
pub mod model;
pub mod presenter;
pub mod provider;

#[cfg(test)]
mod fixtures;

pub use config::{Config, GeolocationMode};
pub use dashboard::{Applied, Dashboard, LoadError, LoadState, RequestKind};
pub use error::{FetchError, LocationError, ModelError, PositionError};
pub use location::{LocationResolver, ResolvedLocation};
pub use model::{CityQuery, Coordinate, ForecastResponse, ForecastSample};
pub use provider::{ForecastSource, openweather::OpenWeatherClient};
