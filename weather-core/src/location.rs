//! Resolving where the initial forecast should be for.
//!
//! A [`Geolocator`] stands in for the platform "current position" capability.
//! [`LocationResolver`] asks it once and falls back to a fixed city when it
//! refuses or fails.

use std::{fmt::Debug, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    config::{Config, GeolocationMode},
    error::{LocationError, PositionError},
    model::{CityQuery, Coordinate},
};

pub const IPINFO_URL: &str = "https://ipinfo.io/json";

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    /// One-shot position request.
    async fn current_position(&self) -> Result<Coordinate, PositionError>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Coordinate);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        Ok(self.0)
    }
}

/// A capability that exists but whose permission was refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedGeolocator;

#[async_trait]
impl Geolocator for DeniedGeolocator {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        Err(PositionError::PermissionDenied)
    }
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    /// "latitude,longitude"
    loc: Option<String>,
}

/// Approximate position from the public IP address (ipinfo.io).
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    endpoint: String,
    http: Client,
}

impl IpGeolocator {
    pub fn new(http: Client) -> Self {
        Self { endpoint: IPINFO_URL.to_string(), http }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        let res = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| PositionError::PositionUnavailable(e.to_string()))?;

        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(PositionError::PermissionDenied);
            }
            status if !status.is_success() => {
                return Err(PositionError::PositionUnavailable(format!(
                    "lookup failed with status {status}"
                )));
            }
            _ => {}
        }

        let body: IpInfoResponse = res
            .json()
            .await
            .map_err(|e| PositionError::PositionUnavailable(e.to_string()))?;

        body.loc
            .as_deref()
            .and_then(parse_loc)
            .ok_or_else(|| PositionError::PositionUnavailable("response had no usable loc".into()))
    }
}

/// Parse ipinfo's `"lat,lon"` pair.
fn parse_loc(loc: &str) -> Option<Coordinate> {
    let (lat, lon) = loc.split_once(',')?;
    let lat = lat.trim().parse().ok()?;
    let lon = lon.trim().parse().ok()?;
    Coordinate::new(lat, lon).ok()
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLocation {
    Position(Coordinate),
    /// Geolocation failed or was refused; query the fallback city instead.
    Fallback { city: CityQuery, reason: PositionError },
}

#[derive(Debug)]
pub struct LocationResolver {
    geolocator: Option<Box<dyn Geolocator>>,
    fallback_city: CityQuery,
}

impl LocationResolver {
    pub fn new(geolocator: Option<Box<dyn Geolocator>>, fallback_city: CityQuery) -> Self {
        Self { geolocator, fallback_city }
    }

    pub fn fallback_city(&self) -> &CityQuery {
        &self.fallback_city
    }

    /// Ask the geolocator once.
    ///
    /// Without a geolocator this fails immediately with
    /// [`LocationError::CapabilityUnavailable`]; no fallback is attempted.
    pub async fn resolve(&self) -> Result<ResolvedLocation, LocationError> {
        let geolocator = self.geolocator.as_ref().ok_or(LocationError::CapabilityUnavailable)?;

        match geolocator.current_position().await {
            Ok(coord) => {
                debug!(%coord, "resolved current position");
                Ok(ResolvedLocation::Position(coord))
            }
            Err(reason) => {
                warn!(%reason, fallback = %self.fallback_city, "geolocation failed, using fallback city");
                Ok(ResolvedLocation::Fallback { city: self.fallback_city.clone(), reason })
            }
        }
    }
}

/// Build the resolver selected by `config.geolocation`.
pub fn resolver_from_config(config: &Config) -> anyhow::Result<LocationResolver> {
    let fallback_city = CityQuery::new(config.fallback_city.as_str())
        .map_err(|e| anyhow!("Invalid fallback_city in config: {e}"))?;

    let geolocator: Option<Box<dyn Geolocator>> = match config.geolocation {
        GeolocationMode::Ip => {
            let http = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| anyhow!("Failed to build HTTP client: {e}"))?;
            Some(Box::new(IpGeolocator::new(http)))
        }
        GeolocationMode::Fixed => {
            let coord = config.fixed_position.ok_or_else(|| {
                anyhow!(
                    "geolocation = \"fixed\" requires a [fixed_position] table with lat and lon."
                )
            })?;
            let coord = Coordinate::new(coord.latitude, coord.longitude)
                .map_err(|e| anyhow!("Invalid fixed_position in config: {e}"))?;
            Some(Box::new(FixedGeolocator(coord)))
        }
        GeolocationMode::Denied => Some(Box::new(DeniedGeolocator)),
        GeolocationMode::None => None,
    };

    Ok(LocationResolver::new(geolocator, fallback_city))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london() -> CityQuery {
        CityQuery::new("London").unwrap()
    }

    #[tokio::test]
    async fn missing_capability_fails_without_fallback() {
        let resolver = LocationResolver::new(None, london());
        assert_eq!(resolver.resolve().await, Err(LocationError::CapabilityUnavailable));
    }

    #[tokio::test]
    async fn position_is_returned_as_is() {
        let coord = Coordinate::new(40.7, -74.0).unwrap();
        let resolver = LocationResolver::new(Some(Box::new(FixedGeolocator(coord))), london());

        assert_eq!(resolver.resolve().await, Ok(ResolvedLocation::Position(coord)));
    }

    #[tokio::test]
    async fn denial_falls_back_to_city() {
        let resolver = LocationResolver::new(Some(Box::new(DeniedGeolocator)), london());

        assert_eq!(
            resolver.resolve().await,
            Ok(ResolvedLocation::Fallback {
                city: london(),
                reason: PositionError::PermissionDenied
            })
        );
    }

    #[tokio::test]
    async fn ip_geolocator_parses_loc() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip": "203.0.113.7",
                "city": "Berlin",
                "loc": "52.5244,13.4105"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let geo = IpGeolocator::new(Client::new()).with_endpoint(server.uri());
        let coord = geo.current_position().await.unwrap();

        assert!((coord.latitude - 52.5244).abs() < 1e-9);
        assert!((coord.longitude - 13.4105).abs() < 1e-9);
    }

    #[tokio::test]
    async fn ip_geolocator_maps_forbidden_to_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let geo = IpGeolocator::new(Client::new()).with_endpoint(server.uri());
        assert_eq!(geo.current_position().await, Err(PositionError::PermissionDenied));
    }

    #[tokio::test]
    async fn ip_geolocator_without_loc_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"bogon": true})))
            .mount(&server)
            .await;

        let geo = IpGeolocator::new(Client::new()).with_endpoint(server.uri());
        assert!(matches!(
            geo.current_position().await,
            Err(PositionError::PositionUnavailable(_))
        ));
    }

    #[test]
    fn parse_loc_rejects_garbage() {
        assert!(parse_loc("1.5,2.5").is_some());
        assert!(parse_loc("1.5").is_none());
        assert!(parse_loc("north,south").is_none());
        assert!(parse_loc("95.0,10.0").is_none());
    }

    #[tokio::test]
    async fn resolver_from_config_honours_mode() {
        let none = Config { geolocation: GeolocationMode::None, ..Config::default() };
        let resolver = resolver_from_config(&none).unwrap();
        assert_eq!(resolver.resolve().await, Err(LocationError::CapabilityUnavailable));

        let fixed = Config {
            geolocation: GeolocationMode::Fixed,
            fixed_position: Some(Coordinate { latitude: 1.0, longitude: 2.0 }),
            ..Config::default()
        };
        let resolver = resolver_from_config(&fixed).unwrap();
        assert_eq!(
            resolver.resolve().await,
            Ok(ResolvedLocation::Position(Coordinate { latitude: 1.0, longitude: 2.0 }))
        );
    }

    #[test]
    fn fixed_mode_requires_position() {
        let cfg = Config { geolocation: GeolocationMode::Fixed, ..Config::default() };
        let err = resolver_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("fixed_position"));
    }

    #[test]
    fn blank_fallback_city_is_rejected() {
        let cfg = Config { fallback_city: " ".into(), ..Config::default() };
        assert!(resolver_from_config(&cfg).is_err());
    }
}
