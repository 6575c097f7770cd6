//! Views derived from a forecast's sample list.
//!
//! Everything here is pure and borrows from the input; nothing panics on an
//! empty or short list.

use serde::Serialize;

use crate::condition::ConditionKind;
use crate::map::MapMarker;
use crate::model::{ForecastResponse, ForecastSample};

/// Samples per "day" at the upstream 3-hour resolution.
pub const SAMPLES_PER_DAY: usize = 8;

/// The two views a dashboard renders from one forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews<'a> {
    /// The first `min(8, n)` samples, roughly the next 24 hours.
    pub today: &'a [ForecastSample],
    /// Samples at indices 0, 8, 16, …
    ///
    /// This is positional sampling: one entry per 8 samples, which is one per
    /// day only when the upstream spacing is a uniform 3 hours. It does not
    /// align to calendar days.
    pub week: Vec<&'a ForecastSample>,
}

pub fn derive(samples: &[ForecastSample]) -> DerivedViews<'_> {
    let today = &samples[..samples.len().min(SAMPLES_PER_DAY)];
    let week = samples.iter().step_by(SAMPLES_PER_DAY).collect();
    DerivedViews { today, week }
}

/// Chance of rain "now", as a percentage: the first sample's `pop`, or 0.
pub fn chance_of_rain(samples: &[ForecastSample]) -> u8 {
    samples.first().map(ForecastSample::rain_percent).unwrap_or(0)
}

/// Headline figures for the first sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature_c: i64,
    pub humidity_pct: u8,
    pub wind_speed_mps: i64,
    pub condition: ConditionKind,
    pub chance_of_rain_pct: u8,
}

impl CurrentConditions {
    /// `None` when there are no samples.
    pub fn from_samples(samples: &[ForecastSample]) -> Option<Self> {
        let now = samples.first()?;
        Some(Self {
            temperature_c: now.temperature().round() as i64,
            humidity_pct: now.humidity(),
            wind_speed_mps: now.wind_speed().round() as i64,
            condition: ConditionKind::from_label(now.condition()),
            chance_of_rain_pct: chance_of_rain(samples),
        })
    }
}

/// Everything a dashboard shows for one forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary<'a> {
    pub city: &'a str,
    pub current: Option<CurrentConditions>,
    #[serde(flatten)]
    pub views: DerivedViews<'a>,
    pub map: MapMarker,
}

pub fn summarize(forecast: &ForecastResponse) -> ForecastSummary<'_> {
    ForecastSummary {
        city: forecast.city_name(),
        current: CurrentConditions::from_samples(forecast.samples()),
        views: derive(forecast.samples()),
        map: MapMarker::for_forecast(forecast),
    }
}
