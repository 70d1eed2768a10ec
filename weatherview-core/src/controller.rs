//! View state and the transitions between its phases.
//!
//! [`Controller::update`] is the only place the view state changes. It does
//! no I/O: every network call, store access or timer it needs comes back to
//! the caller as an [`Effect`], and every completion is fed in again as an
//! [`Action`]. Requests are stamped with a [`RequestId`] so a late response
//! for something the user already moved past is dropped instead of applied.

use std::fmt;
use tracing::{debug, info, warn};

use crate::{
    Config, Location, WeatherError, WeatherSnapshot,
    debounce::is_searchable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A forecast fetch that did not succeed, kept so it can be retried.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub city: String,
    pub error: WeatherError,
}

/// Everything the presentation layer needs to draw the screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub search_open: bool,
    /// Text currently in the search box.
    pub query: String,
    /// Lookup results in provider rank order. Empty unless `search_open`.
    pub candidates: Vec<Location>,
    /// True while a forecast request is in flight and has not produced data.
    pub loading: bool,
    pub snapshot: Option<WeatherSnapshot>,
    pub failure: Option<FetchFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase<'a> {
    /// Not mounted yet.
    Idle,
    Loading,
    SearchOpen,
    Ready(&'a WeatherSnapshot),
    Error(&'a FetchFailure),
}

impl ViewState {
    pub fn phase(&self) -> Phase<'_> {
        if self.loading {
            Phase::Loading
        } else if self.search_open {
            Phase::SearchOpen
        } else if let Some(failure) = &self.failure {
            Phase::Error(failure)
        } else if let Some(snapshot) = &self.snapshot {
            Phase::Ready(snapshot)
        } else {
            Phase::Idle
        }
    }
}

/// Inputs to the controller: user intents and I/O completions.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The view was mounted.
    Start,
    PreferredCityLoaded(Option<String>),
    ToggleSearch,
    QueryEdited(String),
    /// The debouncer decided the query stopped changing.
    QuerySettled(String),
    LocationsLoaded {
        request: RequestId,
        result: Result<Vec<Location>, WeatherError>,
    },
    /// Index into the current candidate list.
    SelectCandidate(usize),
    ForecastLoaded {
        request: RequestId,
        result: Result<WeatherSnapshot, WeatherError>,
    },
    Retry,
}

/// Work the controller asks its runtime to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadPreferredCity,
    ScheduleLookup(String),
    CancelLookup,
    LookupLocations { request: RequestId, query: String },
    FetchForecast { request: RequestId, city: String, days: u8 },
    PersistCity(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub default_city: String,
    pub forecast_days: u8,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Config::default().into()
    }
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_city: config.default_city.clone(),
            forecast_days: config.forecast_days,
        }
    }
}

impl From<Config> for ControllerSettings {
    fn from(config: Config) -> Self {
        (&config).into()
    }
}

#[derive(Debug, Clone)]
struct PendingForecast {
    request: RequestId,
    city: String,
    // Only user selections are remembered; the startup city already is.
    persist: bool,
}

#[derive(Debug)]
pub struct Controller {
    settings: ControllerSettings,
    state: ViewState,
    next_request: u64,
    lookup: Option<RequestId>,
    forecast: Option<PendingForecast>,
    // Whether retrying the current failure should remember the city.
    retry_persists: bool,
}

impl Controller {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            settings,
            state: ViewState::default(),
            next_request: 0,
            lookup: None,
            forecast: None,
            retry_persists: false,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> Phase<'_> {
        self.state.phase()
    }

    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Start => self.start(),
            Action::PreferredCityLoaded(city) => self.preferred_city_loaded(city),
            Action::ToggleSearch => self.toggle_search(),
            Action::QueryEdited(text) => self.query_edited(text),
            Action::QuerySettled(query) => self.query_settled(query),
            Action::LocationsLoaded { request, result } => self.locations_loaded(request, result),
            Action::SelectCandidate(index) => self.select_candidate(index),
            Action::ForecastLoaded { request, result } => self.forecast_loaded(request, result),
            Action::Retry => self.retry(),
        }
    }

    fn issue(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    fn start(&mut self) -> Vec<Effect> {
        if self.phase() != Phase::Idle {
            debug!("view already started");
            return Vec::new();
        }

        self.state.loading = true;
        vec![Effect::LoadPreferredCity]
    }

    fn preferred_city_loaded(&mut self, city: Option<String>) -> Vec<Effect> {
        let city = city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.settings.default_city.clone());

        info!(%city, "loading startup city");
        vec![self.fetch(city, false)]
    }

    fn fetch(&mut self, city: String, persist: bool) -> Effect {
        let request = self.issue();

        self.state.loading = true;
        self.state.failure = None;
        self.retry_persists = false;
        self.forecast = Some(PendingForecast { request, city: city.clone(), persist });

        Effect::FetchForecast { request, city, days: self.settings.forecast_days }
    }

    fn close_search(&mut self) -> Effect {
        self.state.search_open = false;
        self.state.query.clear();
        self.state.candidates.clear();
        self.lookup = None;
        Effect::CancelLookup
    }

    fn toggle_search(&mut self) -> Vec<Effect> {
        if self.state.loading {
            debug!("search toggle ignored while loading");
            return Vec::new();
        }

        if self.state.search_open {
            vec![self.close_search()]
        } else {
            self.state.search_open = true;
            Vec::new()
        }
    }

    fn query_edited(&mut self, text: String) -> Vec<Effect> {
        if !self.state.search_open {
            return Vec::new();
        }

        self.state.query = text.clone();
        vec![Effect::ScheduleLookup(text)]
    }

    fn query_settled(&mut self, query: String) -> Vec<Effect> {
        if !self.state.search_open || !is_searchable(&query) {
            return Vec::new();
        }
        // The box may have changed between the debouncer firing and us seeing it.
        if query != self.state.query {
            debug!(%query, current = %self.state.query, "discarding superseded query");
            return Vec::new();
        }

        let request = self.issue();
        self.lookup = Some(request);
        vec![Effect::LookupLocations { request, query }]
    }

    fn locations_loaded(
        &mut self,
        request: RequestId,
        result: Result<Vec<Location>, WeatherError>,
    ) -> Vec<Effect> {
        if self.lookup != Some(request) || !self.state.search_open {
            debug!(%request, "discarding stale location lookup");
            return Vec::new();
        }
        self.lookup = None;

        match result {
            Ok(candidates) => {
                debug!(%request, count = candidates.len(), "candidates updated");
                self.state.candidates = candidates;
            }
            Err(err) => warn!(%request, error = %err, "location lookup failed"),
        }

        Vec::new()
    }

    fn select_candidate(&mut self, index: usize) -> Vec<Effect> {
        if !self.state.search_open || self.state.loading {
            return Vec::new();
        }

        let Some(city) = self.state.candidates.get(index).map(|loc| loc.name.clone()) else {
            debug!(index, "no candidate at index");
            return Vec::new();
        };

        info!(%city, "location selected");
        let cancel = self.close_search();
        vec![cancel, self.fetch(city, true)]
    }

    fn forecast_loaded(
        &mut self,
        request: RequestId,
        result: Result<WeatherSnapshot, WeatherError>,
    ) -> Vec<Effect> {
        let Some(pending) = self.forecast.take_if(|p| p.request == request) else {
            debug!(%request, "discarding stale forecast");
            return Vec::new();
        };

        self.state.loading = false;

        match result {
            Ok(snapshot) => {
                info!(%request, location = %snapshot.location.name, "forecast ready");
                self.state.snapshot = Some(snapshot);
                self.state.failure = None;

                if pending.persist {
                    vec![Effect::PersistCity(pending.city)]
                } else {
                    Vec::new()
                }
            }
            Err(error) => {
                warn!(%request, city = %pending.city, %error, "forecast fetch failed");
                self.state.failure = Some(FetchFailure { city: pending.city, error });
                self.retry_persists = pending.persist;
                Vec::new()
            }
        }
    }

    fn retry(&mut self) -> Vec<Effect> {
        if self.state.loading || self.state.search_open {
            debug!("retry ignored while loading or searching");
            return Vec::new();
        }
        let Some(failure) = self.state.failure.take() else {
            return Vec::new();
        };

        let persist = std::mem::take(&mut self.retry_persists);
        vec![self.fetch(failure.city, persist)]
    }
}
