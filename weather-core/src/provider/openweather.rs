use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::{
    config::{Config, DEFAULT_BASE_URL},
    error::FetchError,
    model::{CityQuery, Coordinate, ForecastResponse},
};

use super::ForecastSource;

/// Client for the OpenWeather 5-day / 3-hour `/forecast` endpoint.
///
/// Every call makes exactly one request: no retries, no caching.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    /// Build a client from config, honouring `base_url` and `timeout_secs`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.require_api_key()?.to_owned();
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;

        Ok(Self { api_key, base_url: config.base_url.clone(), http })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_forecast(
        &self,
        location: Vec<(&str, String)>,
        described: String,
    ) -> Result<ForecastResponse, FetchError> {
        let url = format!("{}/forecast", self.base_url.trim_end_matches('/'));

        let mut query = location;
        query.push(("appid", self.api_key.clone()));
        query.push(("units", "metric".to_string()));

        debug!(%url, target_location = %described, "requesting forecast");

        let res = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to send forecast request: {e}")))?;

        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(
                %status,
                target_location = %described,
                body = %truncate_body(&body),
                "forecast request rejected"
            );
            return Err(FetchError::NotFound { query: described, status: status.as_u16() });
        }

        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Network(format!("Failed to read forecast response body: {e}")))?;

        parse_forecast(&body)
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherClient {
    async fn fetch_by_city(&self, city: &CityQuery) -> Result<ForecastResponse, FetchError> {
        self.fetch_forecast(vec![("q", city.as_str().to_string())], city.to_string())
            .await
    }

    async fn fetch_by_location(&self, coord: Coordinate) -> Result<ForecastResponse, FetchError> {
        self.fetch_forecast(
            vec![
                ("lat", coord.latitude.to_string()),
                ("lon", coord.longitude.to_string()),
            ],
            coord.to_string(),
        )
        .await
    }
}

/// Parse a `/forecast` body. A payload without samples is rejected.
pub fn parse_forecast(body: &str) -> Result<ForecastResponse, FetchError> {
    let parsed: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("{e} (body: {})", truncate_body(body))))?;

    if parsed.list.is_empty() {
        return Err(FetchError::Parse("forecast response contained no samples".to_string()));
    }

    Ok(parsed)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
