//! Runtime for one weather screen.
//!
//! [`WeatherView`] owns the controller and carries out its effects. I/O runs
//! in spawned tasks whose only job is to send the outcome back over a
//! channel; the view state itself is only touched from `dispatch` and
//! `step`, so a single-threaded executor is all it needs.

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinSet,
};
use tracing::{debug, warn};

use crate::{
    PreferenceStore, WeatherProvider,
    controller::{Action, Controller, ControllerSettings, Effect, Phase, ViewState},
    debounce::{QUIESCENCE_WINDOW, SearchDebouncer},
    render::{Screen, render},
    store::CITY_KEY,
};

#[derive(Debug)]
pub struct WeatherView {
    controller: Controller,
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn PreferenceStore>,
    debouncer: SearchDebouncer,
    actions_tx: UnboundedSender<Action>,
    actions_rx: UnboundedReceiver<Action>,
    settled_rx: UnboundedReceiver<String>,
    // Store writes still in flight; awaited by `flush`.
    writes: JoinSet<()>,
}

impl WeatherView {
    pub fn new(
        settings: ControllerSettings,
        provider: Arc<dyn WeatherProvider>,
        store: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self::with_debounce_window(settings, provider, store, QUIESCENCE_WINDOW)
    }

    pub fn with_debounce_window(
        settings: ControllerSettings,
        provider: Arc<dyn WeatherProvider>,
        store: Arc<dyn PreferenceStore>,
        window: Duration,
    ) -> Self {
        let (actions_tx, actions_rx) = unbounded_channel();
        let (settled_tx, settled_rx) = unbounded_channel();

        Self {
            controller: Controller::new(settings),
            provider,
            store,
            debouncer: SearchDebouncer::new(window, settled_tx),
            actions_tx,
            actions_rx,
            settled_rx,
            writes: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        self.controller.state()
    }

    pub fn phase(&self) -> Phase<'_> {
        self.controller.phase()
    }

    pub fn screen(&self) -> Screen {
        render(self.controller.state())
    }

    /// Mount the view: read the preferred city and fetch its forecast.
    pub fn start(&mut self) {
        self.dispatch(Action::Start);
    }

    /// Apply `action` and run whatever it asks for.
    pub fn dispatch(&mut self, action: Action) {
        for effect in self.controller.update(action) {
            self.run(effect);
        }
    }

    /// Wait for the next completion (I/O result or settled query) and apply
    /// it. Cancel-safe.
    pub async fn step(&mut self) {
        let action = tokio::select! {
            Some(action) = self.actions_rx.recv() => action,
            Some(query) = self.settled_rx.recv() => Action::QuerySettled(query),
            else => return,
        };
        self.dispatch(action);
    }

    /// Wait until every pending preference write has finished. Call before
    /// tearing the runtime down so a just-selected city is not lost.
    pub async fn flush(&mut self) {
        while let Some(joined) = self.writes.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "preference write task failed");
            }
        }
    }

    fn run(&mut self, effect: Effect) {
        debug!(?effect, "running effect");

        match effect {
            Effect::LoadPreferredCity => {
                let store = Arc::clone(&self.store);
                let tx = self.actions_tx.clone();
                tokio::spawn(async move {
                    let city = match store.get(CITY_KEY).await {
                        Ok(city) => city,
                        Err(err) => {
                            warn!(error = %err, "could not read preferred city");
                            None
                        }
                    };
                    let _ = tx.send(Action::PreferredCityLoaded(city));
                });
            }
            Effect::ScheduleLookup(query) => self.debouncer.submit(query),
            Effect::CancelLookup => self.debouncer.cancel(),
            Effect::LookupLocations { request, query } => {
                let provider = Arc::clone(&self.provider);
                let tx = self.actions_tx.clone();
                tokio::spawn(async move {
                    let result = provider.lookup_locations(&query).await;
                    let _ = tx.send(Action::LocationsLoaded { request, result });
                });
            }
            Effect::FetchForecast { request, city, days } => {
                let provider = Arc::clone(&self.provider);
                let tx = self.actions_tx.clone();
                tokio::spawn(async move {
                    let result = provider.fetch_forecast(&city, days).await;
                    let _ = tx.send(Action::ForecastLoaded { request, result });
                });
            }
            Effect::PersistCity(city) => {
                // Reap writes that already finished.
                while self.writes.try_join_next().is_some() {}

                let store = Arc::clone(&self.store);
                self.writes.spawn(async move {
                    if let Err(err) = store.set(CITY_KEY, &city).await {
                        warn!(%city, error = %err, "could not remember city");
                    }
                });
            }
        }
    }
}
