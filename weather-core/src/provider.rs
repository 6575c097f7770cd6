use crate::{
    Config,
    error::FetchError,
    model::{CityQuery, Coordinate, ForecastResponse},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of 5-day / 3-hour forecasts.
///
/// Implementations return the upstream payload as-is; interpreting it is up
/// to the caller (see [`crate::presenter`]).
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch_by_city(&self, city: &CityQuery) -> Result<ForecastResponse, FetchError>;

    async fn fetch_by_location(&self, coord: Coordinate) -> Result<ForecastResponse, FetchError>;
}

/// Construct the forecast source described by `config`.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastSource>> {
    let client = OpenWeatherClient::from_config(config)?;
    Ok(Box::new(client))
}
