//! Core library for the `weatherview` screen.
//!
//! This crate defines:
//! - Configuration handling
//! - The weather provider abstraction and its WeatherAPI.com implementation
//! - The preference store that remembers the last chosen city
//! - Search debouncing, the view state controller and its runtime
//! - Presentation of the view state
//!
//! It is used by `weatherview-cli`, but any front-end that can feed
//! [`Action`]s and draw a [`Screen`] can drive it.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod model;
pub mod provider;
pub mod render;
pub mod store;
pub mod view;

pub use config::Config;
pub use controller::{Action, Controller, ControllerSettings, Effect, FetchFailure, Phase, RequestId, ViewState};
pub use debounce::SearchDebouncer;
pub use error::WeatherError;
pub use model::{CurrentConditions, DailyForecast, Location, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config};
pub use render::{Screen, render};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use view::WeatherView;
