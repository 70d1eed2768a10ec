use crate::{Config, Location, WeatherError, WeatherSnapshot, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

/// Remote source of locations and forecasts.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve free text to candidate locations, best match first.
    /// No match is an empty list, not an error.
    async fn lookup_locations(&self, query: &str) -> Result<Vec<Location>, WeatherError>;

    /// Current conditions plus `days` of daily forecast for `city`.
    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the WeatherAPI.com provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;

    let provider = WeatherApiProvider::new(
        api_key.to_owned(),
        config.base_url.clone(),
        config.request_timeout(),
    )?;

    Ok(Box::new(provider))
}
