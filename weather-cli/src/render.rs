use std::fmt;

use weather_core::{
    ForecastResponse, ForecastSample,
    condition::ConditionKind,
    map::OSM_ATTRIBUTION,
    presenter::{self, ForecastSummary},
};

/// Plain-text rendering of one forecast: current conditions, map link,
/// today's samples and the weekly samples.
pub struct DashboardView<'a> {
    summary: ForecastSummary<'a>,
}

impl<'a> DashboardView<'a> {
    pub fn new(forecast: &'a ForecastResponse) -> Self {
        Self { summary: presenter::summarize(forecast) }
    }
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        writeln!(f, "{}", s.city)?;
        if let Some(now) = &s.current {
            let display = now.condition.display();
            writeln!(f, "  {} {}°  {}", display.glyph, now.temperature_c, display.label)?;
            writeln!(f, "  Chance of rain: {}%", now.chance_of_rain_pct)?;
            writeln!(
                f,
                "  Humidity: {}%   Wind: {} m/s",
                now.humidity_pct, now.wind_speed_mps
            )?;
        }

        writeln!(f)?;
        writeln!(f, "City location")?;
        writeln!(f, "  {} (zoom {})", s.map.center, s.map.zoom)?;
        writeln!(f, "  {}", s.map.browse_url())?;
        writeln!(f, "  Tiles: {} {}", s.map.tile_url_template(), OSM_ATTRIBUTION)?;

        writeln!(f)?;
        writeln!(f, "Today's forecast")?;
        for sample in s.views.today {
            write_row(f, &hour_label(sample), sample)?;
        }

        writeln!(f)?;
        writeln!(f, "Weekly forecast")?;
        for sample in &s.views.week {
            write_row(f, &weekday_label(sample), sample)?;
        }

        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, label: &str, sample: &ForecastSample) -> fmt::Result {
    let display = ConditionKind::from_label(sample.condition()).display();
    writeln!(
        f,
        "  {label:<6} {}  {:>4}°  rain {:>3}%  humidity {:>3}%  wind {} m/s",
        display.glyph,
        sample.temperature().round() as i64,
        sample.rain_percent(),
        sample.humidity(),
        sample.wind_speed().round() as i64,
    )
}

/// "HH:MM", or the raw timestamp if it doesn't parse.
fn hour_label(sample: &ForecastSample) -> String {
    sample
        .timestamp()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| sample.dt_txt.clone())
}

/// Short weekday ("Mon"), or the raw timestamp if it doesn't parse.
fn weekday_label(sample: &ForecastSample) -> String {
    sample
        .timestamp()
        .map(|t| t.format("%a").to_string())
        .unwrap_or_else(|| sample.dt_txt.clone())
}
