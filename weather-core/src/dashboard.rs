//! View state for the dashboard and the loads that mutate it.
//!
//! [`Dashboard`] owns the initial-location result, the search result and the
//! loading flag. Each load is bracketed by [`Dashboard::begin`] and
//! [`Dashboard::finish`]; a completion is applied only if its ticket is the
//! most recently issued one of its kind, so a slow earlier search can never
//! overwrite a newer one.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    error::{FetchError, LocationError},
    location::{LocationResolver, ResolvedLocation},
    model::{CityQuery, ForecastResponse},
    provider::ForecastSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Load for the resolved position or fallback city.
    Initial,
    /// Load for a city the user typed.
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Handle for one issued request. Not `Clone`: [`Dashboard::finish`] takes
/// it by value, so each ticket completes exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    kind: RequestKind,
    seq: u64,
}

impl Ticket {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    /// A newer request of the same kind was issued; the result was dropped.
    Stale,
}

/// A failed load, worded for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Geolocation is not available on this system.")]
    GeolocationUnavailable(#[source] LocationError),
    #[error("Error fetching weather data for your location.")]
    Position(#[source] FetchError),
    #[error("Error fetching weather data for the fallback city.")]
    FallbackCity(#[source] FetchError),
    #[error("Error fetching weather data. Please try again.")]
    Search(#[source] FetchError),
}

/// The three pieces of view state.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub initial: Option<ForecastResponse>,
    pub search: Option<ForecastResponse>,
    pub loading: bool,
}

#[derive(Debug, Default)]
struct Lane {
    issued: u64,
    state: LoadState,
}

#[derive(Debug, Default)]
pub struct Dashboard {
    view: ViewState,
    initial: Lane,
    search: Lane,
    outstanding: usize,
    alert: Option<LoadError>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.view.loading
    }

    pub fn state(&self, kind: RequestKind) -> LoadState {
        match kind {
            RequestKind::Initial => self.initial.state,
            RequestKind::Search => self.search.state,
        }
    }

    /// The forecast to show: the latest search result, else the initial one.
    pub fn displayed(&self) -> Option<&ForecastResponse> {
        self.view.search.as_ref().or(self.view.initial.as_ref())
    }

    /// Take the pending user-facing alert, if any.
    pub fn take_alert(&mut self) -> Option<LoadError> {
        self.alert.take()
    }

    /// Issue a request of `kind`, superseding any outstanding one of that kind.
    pub fn begin(&mut self, kind: RequestKind) -> Ticket {
        let lane = match kind {
            RequestKind::Initial => &mut self.initial,
            RequestKind::Search => &mut self.search,
        };
        lane.issued += 1;
        lane.state = LoadState::Loading;

        self.outstanding += 1;
        self.view.loading = true;

        debug!(?kind, seq = lane.issued, "request issued");
        Ticket { kind, seq: lane.issued }
    }

    /// Record the completion of `ticket`.
    ///
    /// The loading flag is updated for every completion; the outcome itself
    /// is applied only when `ticket` is the latest of its kind.
    pub fn finish(
        &mut self,
        ticket: Ticket,
        outcome: Result<ForecastResponse, LoadError>,
    ) -> Applied {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.view.loading = self.outstanding > 0;

        let (lane, slot) = match ticket.kind {
            RequestKind::Initial => (&mut self.initial, &mut self.view.initial),
            RequestKind::Search => (&mut self.search, &mut self.view.search),
        };

        if ticket.seq != lane.issued {
            debug!(kind = ?ticket.kind, seq = ticket.seq, latest = lane.issued, "discarding stale result");
            return Applied::Stale;
        }

        match outcome {
            Ok(forecast) => {
                info!(kind = ?ticket.kind, city = %forecast.city_name(), "forecast applied");
                lane.state = LoadState::Ready;
                *slot = Some(forecast);
            }
            Err(err) => {
                warn!(kind = ?ticket.kind, error = ?err, "load failed");
                lane.state = LoadState::Failed;
                self.alert = Some(err);
            }
        }

        Applied::Current
    }

    /// Resolve the location and load its forecast.
    ///
    /// A position is fetched by coordinate; a geolocation failure leads to
    /// exactly one fetch of the fallback city. With no geolocation capability
    /// nothing is fetched and the load fails.
    pub async fn load_initial(
        &mut self,
        resolver: &LocationResolver,
        source: &dyn ForecastSource,
    ) -> Applied {
        let ticket = self.begin(RequestKind::Initial);

        let outcome = match resolver.resolve().await {
            Err(err) => Err(LoadError::GeolocationUnavailable(err)),
            Ok(ResolvedLocation::Position(coord)) => {
                source.fetch_by_location(coord).await.map_err(LoadError::Position)
            }
            Ok(ResolvedLocation::Fallback { city, .. }) => {
                source.fetch_by_city(&city).await.map_err(LoadError::FallbackCity)
            }
        };

        self.finish(ticket, outcome)
    }

    /// Search for `input`. Blank input is ignored and returns `None`.
    pub async fn search(&mut self, input: &str, source: &dyn ForecastSource) -> Option<Applied> {
        let city = CityQuery::new(input).ok()?;
        let ticket = self.begin(RequestKind::Search);

        let outcome = source.fetch_by_city(&city).await.map_err(LoadError::Search);
        Some(self.finish(ticket, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::location::{DeniedGeolocator, FixedGeolocator};
    use crate::model::Coordinate;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        City(String),
        Location(Coordinate),
    }

    /// Records every call; cities listed in `missing` answer `NotFound`.
    #[derive(Debug, Default)]
    struct RecordingSource {
        calls: Mutex<Vec<Call>>,
        missing: Vec<&'static str>,
    }

    impl RecordingSource {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ForecastSource for RecordingSource {
        async fn fetch_by_city(&self, city: &CityQuery) -> Result<ForecastResponse, FetchError> {
            self.calls.lock().unwrap().push(Call::City(city.to_string()));
            if self.missing.iter().any(|m| *m == city.as_str()) {
                return Err(FetchError::NotFound { query: city.to_string(), status: 404 });
            }
            Ok(fixtures::forecast(city.as_str(), 40))
        }

        async fn fetch_by_location(&self, coord: Coordinate) -> Result<ForecastResponse, FetchError> {
            self.calls.lock().unwrap().push(Call::Location(coord));
            Ok(fixtures::forecast("Here", 40))
        }
    }

    fn london() -> CityQuery {
        CityQuery::new("London").unwrap()
    }

    #[tokio::test]
    async fn initial_load_uses_position_when_available() {
        let coord = Coordinate::new(35.68, 139.69).unwrap();
        let resolver = LocationResolver::new(Some(Box::new(FixedGeolocator(coord))), london());
        let source = RecordingSource::default();
        let mut dash = Dashboard::new();

        assert_eq!(dash.load_initial(&resolver, &source).await, Applied::Current);

        assert_eq!(source.calls(), vec![Call::Location(coord)]);
        assert_eq!(dash.state(RequestKind::Initial), LoadState::Ready);
        assert_eq!(dash.displayed().map(|f| f.city_name()), Some("Here"));
        assert!(!dash.is_loading());
        assert_eq!(dash.take_alert(), None);
    }

    #[tokio::test]
    async fn denied_geolocation_fetches_fallback_city_once() {
        let resolver = LocationResolver::new(Some(Box::new(DeniedGeolocator)), london());
        let source = RecordingSource::default();
        let mut dash = Dashboard::new();

        dash.load_initial(&resolver, &source).await;

        assert_eq!(source.calls(), vec![Call::City("London".into())]);
        assert_eq!(dash.view().initial.as_ref().map(|f| f.city_name()), Some("London"));
        assert_eq!(dash.state(RequestKind::Initial), LoadState::Ready);
    }

    #[tokio::test]
    async fn missing_capability_fails_without_fetching() {
        let resolver = LocationResolver::new(None, london());
        let source = RecordingSource::default();
        let mut dash = Dashboard::new();

        dash.load_initial(&resolver, &source).await;

        assert!(source.calls().is_empty());
        assert_eq!(dash.state(RequestKind::Initial), LoadState::Failed);
        assert!(!dash.is_loading());
        assert_eq!(
            dash.take_alert(),
            Some(LoadError::GeolocationUnavailable(LocationError::CapabilityUnavailable))
        );
        assert!(dash.displayed().is_none());
    }

    #[tokio::test]
    async fn fallback_fetch_failure_raises_fallback_alert() {
        let resolver = LocationResolver::new(Some(Box::new(DeniedGeolocator)), london());
        let source = RecordingSource { missing: vec!["London"], ..Default::default() };
        let mut dash = Dashboard::new();

        dash.load_initial(&resolver, &source).await;

        let alert = dash.take_alert().unwrap();
        assert_eq!(alert.to_string(), "Error fetching weather data for the fallback city.");
        assert!(!dash.is_loading());
    }

    #[tokio::test]
    async fn failed_search_keeps_prior_state_and_alerts() {
        let resolver = LocationResolver::new(Some(Box::new(DeniedGeolocator)), london());
        let source = RecordingSource { missing: vec!["Atlantis"], ..Default::default() };
        let mut dash = Dashboard::new();

        dash.load_initial(&resolver, &source).await;
        dash.search("Paris", &source).await;
        assert_eq!(dash.displayed().map(|f| f.city_name()), Some("Paris"));

        assert_eq!(dash.search("Atlantis", &source).await, Some(Applied::Current));

        assert_eq!(dash.displayed().map(|f| f.city_name()), Some("Paris"));
        assert_eq!(dash.view().initial.as_ref().map(|f| f.city_name()), Some("London"));
        assert_eq!(dash.state(RequestKind::Search), LoadState::Failed);
        assert!(!dash.is_loading());
        assert_eq!(
            dash.take_alert(),
            Some(LoadError::Search(FetchError::NotFound { query: "Atlantis".into(), status: 404 }))
        );
    }

    #[tokio::test]
    async fn blank_search_is_ignored() {
        let source = RecordingSource::default();
        let mut dash = Dashboard::new();

        assert_eq!(dash.search("   ", &source).await, None);
        assert!(source.calls().is_empty());
        assert_eq!(dash.state(RequestKind::Search), LoadState::Idle);
    }

    #[test]
    fn search_result_takes_precedence_over_initial() {
        let mut dash = Dashboard::new();

        let initial = dash.begin(RequestKind::Initial);
        dash.finish(initial, Ok(fixtures::forecast("London", 8)));
        assert_eq!(dash.displayed().map(|f| f.city_name()), Some("London"));

        let search = dash.begin(RequestKind::Search);
        dash.finish(search, Ok(fixtures::forecast("Rome", 8)));
        assert_eq!(dash.displayed().map(|f| f.city_name()), Some("Rome"));
        assert_eq!(dash.view().initial.as_ref().map(|f| f.city_name()), Some("London"));
    }

    #[test]
    fn stale_search_completion_is_discarded() {
        let mut dash = Dashboard::new();

        let slow = dash.begin(RequestKind::Search);
        let fast = dash.begin(RequestKind::Search);

        assert_eq!(dash.finish(fast, Ok(fixtures::forecast("Rome", 8))), Applied::Current);
        assert!(dash.is_loading());

        assert_eq!(dash.finish(slow, Ok(fixtures::forecast("Oslo", 8))), Applied::Stale);
        assert!(!dash.is_loading());
        assert_eq!(dash.displayed().map(|f| f.city_name()), Some("Rome"));
        assert_eq!(dash.state(RequestKind::Search), LoadState::Ready);
    }

    #[test]
    fn stale_failure_raises_no_alert() {
        let mut dash = Dashboard::new();

        let slow = dash.begin(RequestKind::Search);
        let fast = dash.begin(RequestKind::Search);
        dash.finish(fast, Ok(fixtures::forecast("Rome", 8)));

        let err = LoadError::Search(FetchError::Network("timeout".into()));
        assert_eq!(dash.finish(slow, Err(err)), Applied::Stale);
        assert_eq!(dash.take_alert(), None);
        assert_eq!(dash.state(RequestKind::Search), LoadState::Ready);
    }

    #[test]
    fn kinds_are_sequenced_independently() {
        let mut dash = Dashboard::new();

        let initial = dash.begin(RequestKind::Initial);
        let search = dash.begin(RequestKind::Search);
        assert_eq!(initial.kind(), RequestKind::Initial);
        assert_eq!(search.kind(), RequestKind::Search);

        assert_eq!(dash.finish(search, Ok(fixtures::forecast("Rome", 8))), Applied::Current);
        assert_eq!(dash.state(RequestKind::Initial), LoadState::Loading);
        assert!(dash.is_loading());

        assert_eq!(dash.finish(initial, Ok(fixtures::forecast("London", 8))), Applied::Current);
        assert!(!dash.is_loading());
    }

    #[test]
    fn each_ticket_completes_once_and_clears_loading() {
        let mut dash = Dashboard::new();

        let first = dash.begin(RequestKind::Search);
        let second = dash.begin(RequestKind::Search);
        assert_ne!(first, second);

        // Two tickets issued, two completions: loading clears after the second only.
        dash.finish(second, Ok(fixtures::forecast("Rome", 8)));
        assert!(dash.is_loading());
        dash.finish(first, Ok(fixtures::forecast("Oslo", 8)));
        assert!(!dash.is_loading());
        assert_eq!(dash.displayed().unwrap().city.name, "Rome");
    }
}
