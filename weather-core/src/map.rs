use serde::Serialize;

use crate::model::{Coordinate, ForecastResponse};

pub const DEFAULT_ZOOM: u8 = 12;
pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

/// Where to center a map and what to pin on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub center: Coordinate,
    pub zoom: u8,
    pub label: String,
}

impl MapMarker {
    pub fn for_forecast(forecast: &ForecastResponse) -> Self {
        Self {
            center: forecast.coordinate(),
            zoom: DEFAULT_ZOOM,
            label: forecast.city_name().to_string(),
        }
    }

    pub fn tile_url_template(&self) -> &'static str {
        OSM_TILE_URL
    }

    /// openstreetmap.org link with a marker at the center.
    pub fn browse_url(&self) -> String {
        let Coordinate { latitude, longitude } = self.center;
        format!(
            "https://www.openstreetmap.org/?mlat={latitude:.4}&mlon={longitude:.4}#map={}/{latitude:.4}/{longitude:.4}",
            self.zoom
        )
    }
}
