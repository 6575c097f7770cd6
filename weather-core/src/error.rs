use thiserror::Error;

/// Invalid domain values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("City name must not be empty")]
    EmptyCity,
    #[error("Latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
}

/// Why a geolocator could not produce a position.
///
/// Both variants lead the resolver to the fallback city.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Geolocation is not available on this system")]
    CapabilityUnavailable,
}

/// Forecast retrieval failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Any non-success upstream status.
    #[error("No forecast found for {query} (upstream status {status})")]
    NotFound { query: String, status: u16 },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to parse forecast response: {0}")]
    Parse(String),
}
